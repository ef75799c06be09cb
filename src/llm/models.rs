use chrono::{DateTime, Utc};
use serde::Serialize;

/// First message of every new session.
pub const GREETING: &str = "Hi, I'm a SQL assistant. How can I help you?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationRole {
    Human,
    Assistant,
}

impl ConversationRole {
    /// Speaker label used in prompt transcripts.
    pub fn label(&self) -> &'static str {
        match self {
            ConversationRole::Human => "Human",
            ConversationRole::Assistant => "AI",
        }
    }
}

/// One message of a conversation. Fields are read-only once built.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationTurn {
    role: ConversationRole,
    content: String,
    created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: ConversationRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::new(ConversationRole::Human, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ConversationRole::Assistant, content)
    }

    pub fn role(&self) -> ConversationRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Append-only, ordered list of turns.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_greeting() -> Self {
        let mut history = Self::new();
        history.push(ConversationTurn::assistant(GREETING));
        history
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// `Human: ...` / `AI: ...` lines in order, or `(none)` for an empty history.
    pub fn transcript(&self) -> String {
        if self.turns.is_empty() {
            return "(none)".to_string();
        }

        self.turns
            .iter()
            .map(|turn| format!("{}: {}", turn.role.label(), turn.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
