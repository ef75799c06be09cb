use minijinja::context;
use std::sync::Arc;
use tracing::debug;

use crate::db::{QueryResult, SchemaDescription};
use crate::error::GenerationError;
use crate::llm::models::ConversationHistory;
use crate::llm::prompts::{ANSWER_PROMPT, PromptTemplates};
use crate::llm::CompletionService;

/// Second model call of a turn: explains the executed SQL and its rows.
pub struct AnswerGenerationStage {
    llm: Arc<dyn CompletionService>,
    prompts: Arc<PromptTemplates>,
    max_result_rows: usize,
}

impl AnswerGenerationStage {
    pub fn new(
        llm: Arc<dyn CompletionService>,
        prompts: Arc<PromptTemplates>,
        max_result_rows: usize,
    ) -> Self {
        Self {
            llm,
            prompts,
            max_result_rows,
        }
    }

    pub fn render_prompt(
        &self,
        schema: &SchemaDescription,
        history: &ConversationHistory,
        question: &str,
        sql: &str,
        result: &QueryResult,
    ) -> Result<String, GenerationError> {
        self.prompts.render(
            ANSWER_PROMPT,
            context! {
                schema => schema.as_str(),
                history => history.transcript(),
                question => question,
                query => sql,
                response => result.render_table(self.max_result_rows),
            },
        )
    }

    pub async fn generate_answer(
        &self,
        schema: &SchemaDescription,
        history: &ConversationHistory,
        question: &str,
        sql: &str,
        result: &QueryResult,
    ) -> Result<String, GenerationError> {
        let prompt = self.render_prompt(schema, history, question, sql, result)?;
        debug!("Answer generation prompt: {}", prompt);

        let answer = self.llm.complete(&prompt).await?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(GenerationError::InvalidResponse {
                provider: self.llm.provider_name().to_string(),
                reason: "empty answer completion".to_string(),
            });
        }

        Ok(answer.to_string())
    }
}
