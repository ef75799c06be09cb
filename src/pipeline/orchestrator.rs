use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::db::{DatabaseHandle, QueryResult, SchemaCache};
use crate::error::{GenerationError, TurnError};
use crate::llm::models::ConversationHistory;
use crate::llm::prompts::PromptTemplates;
use crate::llm::CompletionService;
use crate::pipeline::answer_stage::AnswerGenerationStage;
use crate::pipeline::sql_stage::SqlGenerationStage;

/// Everything a successful turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub sql: String,
    pub result: QueryResult,
    pub answer: String,
}

/// Runs schema lookup, SQL generation, execution and answer generation in order.
pub struct Orchestrator {
    schema_cache: Arc<SchemaCache>,
    sql_stage: SqlGenerationStage,
    answer_stage: AnswerGenerationStage,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn CompletionService>,
        schema_cache: Arc<SchemaCache>,
        max_result_rows: usize,
    ) -> Result<Self, GenerationError> {
        let prompts = Arc::new(PromptTemplates::new()?);

        Ok(Self {
            schema_cache,
            sql_stage: SqlGenerationStage::new(Arc::clone(&llm), Arc::clone(&prompts)),
            answer_stage: AnswerGenerationStage::new(llm, prompts, max_result_rows),
        })
    }

    pub fn schema_cache(&self) -> &Arc<SchemaCache> {
        &self.schema_cache
    }

    /// Answers one question. Never fails: errors come back as the answer text.
    ///
    /// The turn runs as its own task so the caller's task is free while the
    /// model and the database are busy; the caller only awaits the final string.
    pub async fn answer(
        self: &Arc<Self>,
        question: &str,
        handle: &DatabaseHandle,
        history: &ConversationHistory,
    ) -> String {
        let this = Arc::clone(self);
        let question = question.to_string();
        let handle = handle.clone();
        let history = history.clone();

        let turn = tokio::spawn(async move { this.run_turn(&question, &handle, &history).await });

        let outcome = match turn.await {
            Ok(outcome) => outcome,
            Err(e) => Err(TurnError::Worker(e.to_string())),
        };

        match outcome {
            Ok(outcome) => outcome.answer,
            Err(e) => {
                error!("Turn failed: {}", e);
                error_answer(&e)
            }
        }
    }

    /// The same sequence as [`Orchestrator::answer`] with typed results. Step 3
    /// is not rolled back if step 4 fails.
    pub async fn run_turn(
        &self,
        question: &str,
        handle: &DatabaseHandle,
        history: &ConversationHistory,
    ) -> Result<TurnOutcome, TurnError> {
        let started = Instant::now();
        info!("Answering question on handle {}: {}", handle.id(), question);

        let schema = self.schema_cache.get_schema(handle).await?;

        let sql = self.sql_stage.generate_sql(&schema, history, question).await?;

        let result = handle.execute(&sql).await?;
        info!("Query returned {} rows", result.row_count());

        let answer = self
            .answer_stage
            .generate_answer(&schema, history, question, &sql, &result)
            .await?;

        info!("Turn completed in {}ms", started.elapsed().as_millis());
        Ok(TurnOutcome {
            sql,
            result,
            answer,
        })
    }
}

/// User-visible text for a failed turn.
pub fn error_answer(err: &TurnError) -> String {
    format!("An error occurred: {}", err)
}
