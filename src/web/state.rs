use crate::config::AppConfig;
use crate::db::DatabaseHandle;
use crate::llm::models::ConversationHistory;
use crate::pipeline::Orchestrator;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Per-browser state: the connected handle and the conversation so far.
///
/// Kept behind an async mutex that a chat turn holds until it finishes, so a
/// session never has two turns in flight.
pub struct SessionState {
    pub handle: Option<DatabaseHandle>,
    pub history: ConversationHistory,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            handle: None,
            history: ConversationHistory::with_greeting(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared application state for the web server
pub struct AppState {
    pub config: AppConfig,
    pub orchestrator: Arc<Orchestrator>,
    pub model_name: String,
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionState>>>>,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, orchestrator: Arc<Orchestrator>, model_name: String) -> Self {
        Self {
            config,
            orchestrator,
            model_name,
            sessions: RwLock::new(HashMap::new()),
            startup_time: chrono::Utc::now(),
        }
    }

    /// Returns the session for `session_id`, creating it on first use.
    pub async fn session(&self, session_id: &str) -> Arc<Mutex<SessionState>> {
        if let Some(session) = self.sessions.read().await.get(session_id) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write().await;
        Arc::clone(sessions.entry(session_id.to_string()).or_insert_with(|| {
            debug!("Created session {}", session_id);
            Arc::new(Mutex::new(SessionState::new()))
        }))
    }

    /// Looks up a session without creating it.
    pub async fn existing_session(&self, session_id: &str) -> Option<Arc<Mutex<SessionState>>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
