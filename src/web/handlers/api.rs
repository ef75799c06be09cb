use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::db::{ConnectParams, DatabaseDriver, DatabaseHandle, HandleId};
use crate::llm::models::{ConversationHistory, ConversationTurn};
use crate::web::state::AppState;

pub const NOT_CONNECTED_ANSWER: &str = "Please connect to a database first.";

// Connection types

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub session_id: String,
    pub driver: Option<DatabaseDriver>,
    pub user: Option<String>,
    #[serde(default)]
    pub password: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub connected: bool,
    pub handle_id: HandleId,
    pub connection: String,
}

#[derive(Debug, Serialize)]
pub struct ConnectionDefaults {
    pub driver: DatabaseDriver,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub database: String,
}

// Chat types

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

// System status

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime_seconds: i64,
    pub session_count: usize,
    pub model: String,
}

// API Implementations

pub async fn connect(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>, (StatusCode, String)> {
    let defaults = &state.config.database;
    let params = ConnectParams {
        driver: payload.driver.unwrap_or(defaults.driver),
        user: payload.user.unwrap_or_else(|| defaults.user.clone()),
        password: payload.password,
        host: payload.host.unwrap_or_else(|| defaults.host.clone()),
        port: payload.port.unwrap_or(defaults.port),
        database: payload.database.unwrap_or_else(|| defaults.database.clone()),
    };

    let handle = DatabaseHandle::connect(params, defaults.pool_settings())
        .await
        .map_err(|e| {
            error!("Connect failed for session {}: {}", payload.session_id, e);
            (StatusCode::BAD_GATEWAY, e.to_string())
        })?;

    // Read the schema now so the first question doesn't pay for it
    let cache = state.orchestrator.schema_cache();
    cache.get_schema(&handle).await.map_err(|e| {
        error!("Schema introspection failed for {}: {}", handle.redacted_url(), e);
        (StatusCode::BAD_GATEWAY, e.to_string())
    })?;

    let session = state.session(&payload.session_id).await;
    let mut session = session.lock().await;
    if let Some(previous) = session.handle.replace(handle.clone()) {
        info!("Session {} replaced handle {}", payload.session_id, previous.id());
        cache.forget(previous.id()).await;
    }

    Ok(Json(ConnectResponse {
        connected: true,
        handle_id: handle.id(),
        connection: handle.redacted_url(),
    }))
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let question = payload.question.trim();
    if question.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Question must not be empty".to_string()));
    }

    let session = state.session(&payload.session_id).await;
    // Held for the whole turn: one outstanding turn per session
    let mut session = session.lock().await;
    session.history.push(ConversationTurn::human(question));

    let answer = match session.handle.clone() {
        Some(handle) => {
            state
                .orchestrator
                .answer(question, &handle, &session.history)
                .await
        }
        None => {
            warn!("Session {} asked a question without a connection", payload.session_id);
            NOT_CONNECTED_ANSWER.to_string()
        }
    };

    session.history.push(ConversationTurn::assistant(answer.clone()));
    Ok(Json(ChatResponse { answer }))
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Json<ConversationHistory> {
    // Unknown ids see the greeting of a fresh session without registering one
    match state.existing_session(&query.session_id).await {
        Some(session) => Json(session.lock().await.history.clone()),
        None => Json(ConversationHistory::with_greeting()),
    }
}

pub async fn connection_defaults(State(state): State<Arc<AppState>>) -> Json<ConnectionDefaults> {
    let db = &state.config.database;
    Json(ConnectionDefaults {
        driver: db.driver,
        host: db.host.clone(),
        port: db.port,
        user: db.user.clone(),
        database: db.database.clone(),
    })
}

pub async fn system_status(State(state): State<Arc<AppState>>) -> Json<SystemStatus> {
    let uptime = chrono::Utc::now()
        .signed_duration_since(state.startup_time)
        .num_seconds();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
        session_count: state.session_count().await,
        model: state.model_name.clone(),
    })
}

pub async fn get_schema(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<String, (StatusCode, String)> {
    let not_connected = || (StatusCode::NOT_FOUND, NOT_CONNECTED_ANSWER.to_string());
    let session = state
        .existing_session(&query.session_id)
        .await
        .ok_or_else(not_connected)?;
    let handle = session.lock().await.handle.clone().ok_or_else(not_connected)?;

    let schema = state
        .orchestrator
        .schema_cache()
        .get_schema(&handle)
        .await
        .map_err(|e| (StatusCode::BAD_GATEWAY, e.to_string()))?;

    Ok(schema.to_string())
}
