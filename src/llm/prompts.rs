use minijinja::Environment;
use serde::Serialize;
use tracing::error;

use crate::error::GenerationError;

pub const SQL_PROMPT: &str = "generate_sql.txt";
pub const ANSWER_PROMPT: &str = "generate_answer.txt";

/// The two fixed prompt templates. `.txt` names keep minijinja from HTML-escaping.
pub struct PromptTemplates {
    env: Environment<'static>,
}

impl PromptTemplates {
    pub fn new() -> Result<Self, GenerationError> {
        let mut env = Environment::new();

        env.add_template(SQL_PROMPT, include_str!("../../templates/generate_sql.txt"))?;
        env.add_template(ANSWER_PROMPT, include_str!("../../templates/generate_answer.txt"))?;

        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String, GenerationError> {
        let template = self.env.get_template(name).map_err(|e| {
            error!("Prompt template not found: {} ({})", name, e);
            GenerationError::from(e)
        })?;

        template.render(context).map_err(|e| {
            error!("Prompt render error in {}: {}", name, e);
            GenerationError::from(e)
        })
    }
}
