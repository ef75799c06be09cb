use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::db::handle::{DatabaseDriver, PoolSettings};

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub driver: DatabaseDriver,
    // Connection form defaults, the user can override all of them per session
    pub host: String,
    pub port: u16,
    pub user: String,
    pub database: String,
    pub pool_size: u32,
    pub max_overflow: u32,
    pub acquire_timeout_secs: u64,
    pub schema_cache_capacity: usize,
    pub max_result_rows: usize,
}

impl DatabaseConfig {
    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            pool_size: self.pool_size,
            max_overflow: self.max_overflow,
            acquire_timeout: Duration::from_secs(self.acquire_timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub backend: String, // "remote" or "ollama"
    pub model: String,
    pub api_key: Option<String>,
    pub api_url: Option<String>,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_tokens: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub llm: LlmConfig,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config_builder = Config::builder()
            .set_default("web.host", "127.0.0.1")?
            .set_default("web.port", 3000_i64)?
            .set_default("llm.backend", "remote")?
            .set_default("llm.model", "mixtral-8x7b-32768")?
            .set_default("llm.temperature", 0.0_f64)?
            .set_default("llm.timeout_secs", 60_i64)?
            .set_default("llm.max_tokens", 2000_i64)?
            .set_default("database.driver", "mysql")?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 3306_i64)?
            .set_default("database.user", "")?
            .set_default("database.database", "world")?
            .set_default("database.pool_size", 10_i64)?
            .set_default("database.max_overflow", 20_i64)?
            .set_default("database.acquire_timeout_secs", 30_i64)?
            .set_default("database.schema_cache_capacity", 32_i64)?
            .set_default("database.max_result_rows", 200_i64)?;

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            // Check for config in default locations
            let default_locations = vec![
                "config.toml",
                "config/config.toml",
                "/etc/sql-chat/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        // SQL_CHAT__LLM__API_KEY, SQL_CHAT__WEB__PORT, ...
        config_builder = config_builder.add_source(
            Environment::with_prefix("SQL_CHAT")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        // Override with command line args if provided
        if let Some(host) = &args.host {
            config.web.host = host.clone();
        }
        if let Some(port) = args.port {
            config.web.port = port;
        }

        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var("GROQ_API_KEY").ok();
        }

        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                driver: DatabaseDriver::MySql,
                host: "localhost".to_string(),
                port: 3306,
                user: String::new(),
                database: "world".to_string(),
                pool_size: 10,
                max_overflow: 20,
                acquire_timeout_secs: 30,
                schema_cache_capacity: 32,
                max_result_rows: 200,
            },
            web: WebConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            llm: LlmConfig {
                backend: "remote".to_string(),
                model: "mixtral-8x7b-32768".to_string(),
                api_key: None,
                api_url: None,
                temperature: 0.0,
                timeout_secs: 60,
                max_tokens: 2000,
            },
        }
    }
}
