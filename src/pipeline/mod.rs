//! The two-stage prompt chain and the orchestrator that sequences it.

pub mod answer_stage;
pub mod orchestrator;
pub mod sql_stage;

pub use answer_stage::AnswerGenerationStage;
pub use orchestrator::{error_answer, Orchestrator, TurnOutcome};
pub use sql_stage::SqlGenerationStage;
