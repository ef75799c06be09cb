//! Ask questions about a relational database in plain language.
//!
//! A turn renders a prompt from the schema, the conversation and the question,
//! asks a completion service for SQL, runs that SQL as-is, and asks the service
//! again to explain the rows.

pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod util;
pub mod web;
