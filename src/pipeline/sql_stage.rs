use minijinja::context;
use std::sync::Arc;
use tracing::{debug, info};

use crate::db::SchemaDescription;
use crate::error::GenerationError;
use crate::llm::models::ConversationHistory;
use crate::llm::prompts::{PromptTemplates, SQL_PROMPT};
use crate::llm::CompletionService;

/// First model call of a turn: question in, one SQL statement out.
pub struct SqlGenerationStage {
    llm: Arc<dyn CompletionService>,
    prompts: Arc<PromptTemplates>,
}

impl SqlGenerationStage {
    pub fn new(llm: Arc<dyn CompletionService>, prompts: Arc<PromptTemplates>) -> Self {
        Self { llm, prompts }
    }

    pub fn render_prompt(
        &self,
        schema: &SchemaDescription,
        history: &ConversationHistory,
        question: &str,
    ) -> Result<String, GenerationError> {
        self.prompts.render(
            SQL_PROMPT,
            context! {
                schema => schema.as_str(),
                history => history.transcript(),
                question => question,
            },
        )
    }

    /// The completion is trusted as a single executable statement; only
    /// surrounding whitespace is removed.
    pub async fn generate_sql(
        &self,
        schema: &SchemaDescription,
        history: &ConversationHistory,
        question: &str,
    ) -> Result<String, GenerationError> {
        let prompt = self.render_prompt(schema, history, question)?;
        debug!("SQL generation prompt: {}", prompt);

        let completion = self.llm.complete(&prompt).await?;
        let sql = completion.trim();
        if sql.is_empty() {
            return Err(GenerationError::InvalidResponse {
                provider: self.llm.provider_name().to_string(),
                reason: "empty SQL completion".to_string(),
            });
        }

        info!("Generated SQL: {}", sql);
        Ok(sql.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::models::ConversationTurn;
    use async_trait::async_trait;

    struct CannedLlm(&'static str);

    #[async_trait]
    impl CompletionService for CannedLlm {
        fn provider_name(&self) -> &str {
            "canned"
        }
        fn model_name(&self) -> &str {
            "canned"
        }
        async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
            Ok(self.0.to_string())
        }
    }

    fn stage(reply: &'static str) -> SqlGenerationStage {
        SqlGenerationStage::new(
            Arc::new(CannedLlm(reply)),
            Arc::new(PromptTemplates::new().unwrap()),
        )
    }

    #[test]
    fn test_prompt_embeds_worked_examples() {
        let schema = SchemaDescription::new("CREATE TABLE Track (TrackId INT, ArtistId INT);");
        let mut history = ConversationHistory::with_greeting();
        history.push(ConversationTurn::human("which 3 artists have the most tracks?"));

        let prompt = stage("")
            .render_prompt(&schema, &history, "which 3 artists have the most tracks?")
            .unwrap();

        assert!(prompt.contains(
            "SELECT ArtistId, COUNT(*) as track_count FROM Track GROUP BY ArtistId ORDER BY track_count DESC LIMIT 3;"
        ));
        assert!(prompt.contains("SQL Query: SELECT Name FROM Artist LIMIT 10;"));
        assert!(prompt.contains("<SCHEMA>CREATE TABLE Track (TrackId INT, ArtistId INT);</SCHEMA>"));
        assert!(prompt.contains("Human: which 3 artists have the most tracks?"));
        assert!(prompt.trim_end().ends_with(
            "Question: which 3 artists have the most tracks?\nSQL Query:"
        ));
    }

    #[test]
    fn test_history_order_in_prompt() {
        let mut history = ConversationHistory::new();
        history.push(ConversationTurn::human("first"));
        history.push(ConversationTurn::assistant("second"));

        let prompt = stage("")
            .render_prompt(&SchemaDescription::new("s"), &history, "third")
            .unwrap();
        let first = prompt.find("Human: first").unwrap();
        let second = prompt.find("AI: second").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_completion_is_trimmed_not_rewritten() {
        let sql = stage("\n  SELECT `Name` FROM Artist LIMIT 10;  \n")
            .generate_sql(&SchemaDescription::new("s"), &ConversationHistory::new(), "q")
            .await
            .unwrap();
        assert_eq!(sql, "SELECT `Name` FROM Artist LIMIT 10;");
    }

    #[tokio::test]
    async fn test_blank_completion_is_an_error() {
        let err = stage("   ")
            .generate_sql(&SchemaDescription::new("s"), &ConversationHistory::new(), "q")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::InvalidResponse { .. }));
    }
}
