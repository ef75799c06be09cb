use crate::config::LlmConfig;
use crate::error::GenerationError;
use crate::llm::CompletionService;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

pub const DEFAULT_API_URL: &str = "http://localhost:11434/api/generate";

const PROVIDER: &str = "ollama";

pub struct OllamaProvider {
    client: reqwest::Client,
    api_url: String,
    model: String,
    temperature: f32,
}

#[derive(Serialize, Debug)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize, Debug)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Deserialize, Debug)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    done: Option<bool>,
}

impl OllamaProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, GenerationError> {
        let api_url = config
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_url,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl CompletionService for OllamaProvider {
    fn provider_name(&self) -> &str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        info!("Sending request to Ollama with model: {}", self.model);
        debug!("API URL: {}", self.api_url);

        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Unavailable {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = match response.text().await {
                Ok(body) => format!(" - Response body: {}", body),
                Err(_) => String::new(),
            };

            error!("Ollama API responded with status code: {}{}", status, error_body);
            return Err(GenerationError::Unavailable {
                provider: PROVIDER.to_string(),
                reason: format!("Ollama API responded with status code: {}{}", status, error_body),
            });
        }

        let response_text = response.text().await.map_err(|e| GenerationError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: format!("Failed to read response body: {}", e),
        })?;

        debug!("Raw response from Ollama: {}", response_text);

        let ollama_response = serde_json::from_str::<OllamaResponse>(&response_text).map_err(|e| {
            error!("Failed to parse Ollama response: {} - Response was: {}", e, response_text);
            GenerationError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: format!("Failed to parse Ollama response: {}", e),
            }
        })?;

        if ollama_response.done == Some(false) {
            debug!("Ollama reported an unfinished generation");
        }

        Ok(ollama_response.response)
    }
}
