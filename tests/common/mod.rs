#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use sql_chat::db::{ConnectParams, DatabaseHandle, PoolSettings};
use sql_chat::error::GenerationError;
use sql_chat::llm::CompletionService;

/// Completion stub that plays back a fixed list of replies and keeps every prompt.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<Result<String, GenerationError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(replies: &[&str]) -> Arc<Self> {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedLlm {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(GenerationError::InvalidResponse {
                    provider: "scripted".to_string(),
                    reason: "no scripted reply left".to_string(),
                })
            })
    }
}

/// Answers SQL prompts with a fixed query and answer prompts with a fixed sentence.
pub struct KeywordLlm {
    pub sql: &'static str,
    pub answer: &'static str,
}

#[async_trait]
impl CompletionService for KeywordLlm {
    fn provider_name(&self) -> &str {
        "keyword"
    }

    fn model_name(&self) -> &str {
        "keyword-model"
    }

    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        if prompt.contains("Write only the SQL query") {
            Ok(self.sql.to_string())
        } else {
            Ok(self.answer.to_string())
        }
    }
}

/// A DuckDB file with an `Artist` table of 20 rows.
pub fn seed_artists(dir: &Path) -> PathBuf {
    let path = dir.join("music.duckdb");
    let conn = duckdb::Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE Artist (ArtistId INTEGER NOT NULL, Name VARCHAR);
         INSERT INTO Artist SELECT i, 'Artist ' || CAST(i AS VARCHAR) FROM range(1, 21) t(i);",
    )
    .unwrap();
    path
}

pub fn test_pool() -> PoolSettings {
    PoolSettings {
        pool_size: 2,
        max_overflow: 1,
        acquire_timeout: Duration::from_secs(5),
    }
}

pub async fn connect_duckdb(path: &Path) -> DatabaseHandle {
    DatabaseHandle::connect(
        ConnectParams::duckdb(path.to_string_lossy().to_string()),
        test_pool(),
    )
    .await
    .unwrap()
}
