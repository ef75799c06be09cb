//! Error types for the SQL chat core.
//!
//! Connection failures are surfaced to the presentation layer as a distinct
//! state. Everything that goes wrong during a turn ends up as a [`TurnError`]
//! and is turned into answer text by the orchestrator.

/// Failures while opening a handle or reading its schema.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Unsupported database driver: {0}")]
    UnsupportedDriver(String),

    #[error("Invalid connection settings: {0}")]
    InvalidSettings(String),

    #[error("Failed to connect to {target}: {reason}")]
    ConnectFailed { target: String, reason: String },

    #[error("Failed to read schema: {0}")]
    Introspection(String),

    #[error("Database worker failed: {0}")]
    Worker(String),
}

/// Failures while running generated SQL.
#[derive(Debug, thiserror::Error)]
pub enum QueryExecutionError {
    #[error("Timed out waiting for a pooled connection: {0}")]
    PoolTimeout(String),

    /// Backend error text, kept verbatim.
    #[error("{0}")]
    Backend(String),

    #[error("Database worker failed: {0}")]
    Worker(String),
}

/// Failures of the text-generation service or of prompt rendering.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Provider {provider} unavailable: {reason}")]
    Unavailable { provider: String, reason: String },

    #[error("Provider {provider} rate limited the request")]
    RateLimited { provider: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Prompt template error: {0}")]
    Template(String),

    #[error("LLM configuration error: {0}")]
    Config(String),
}

impl From<minijinja::Error> for GenerationError {
    fn from(e: minijinja::Error) -> Self {
        GenerationError::Template(e.to_string())
    }
}

/// Anything that can end a turn early.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error(transparent)]
    Schema(#[from] ConnectionError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Query failed: {0}")]
    Query(#[from] QueryExecutionError),

    #[error("Turn worker failed: {0}")]
    Worker(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_keeps_backend_text() {
        let backend = "Table 'world.Artist' doesn't exist";
        let err = TurnError::from(QueryExecutionError::Backend(backend.to_string()));
        assert!(err.to_string().contains(backend));
    }

    #[test]
    fn test_generation_error_display() {
        let err = GenerationError::RateLimited {
            provider: "groq".to_string(),
        };
        assert_eq!(err.to_string(), "Provider groq rate limited the request");
    }
}
