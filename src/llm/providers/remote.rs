use crate::config::LlmConfig;
use crate::error::GenerationError;
use crate::llm::CompletionService;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

/// Groq's OpenAI-compatible endpoint.
pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

const PROVIDER: &str = "remote";

/// Any OpenAI-compatible `chat/completions` endpoint.
pub struct RemoteLlmProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Serialize)]
struct PromptRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct PromptResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl RemoteLlmProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, GenerationError> {
        let api_url = config
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let api_key = config.api_key.clone().ok_or_else(|| {
            GenerationError::Config(
                "API key is required for remote LLM provider (llm.api_key or GROQ_API_KEY)"
                    .to_string(),
            )
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_url,
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl CompletionService for RemoteLlmProvider {
    fn provider_name(&self) -> &str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = PromptRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        info!("Sending completion request to {} with model: {}", self.api_url, self.model);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Unavailable {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            error!("Completion API rate limited the request");
            return Err(GenerationError::RateLimited {
                provider: PROVIDER.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| GenerationError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: format!("Failed to read response body: {}", e),
        })?;

        if !status.is_success() {
            error!("Completion API responded with status code: {} - {}", status, body);
            return Err(GenerationError::Unavailable {
                provider: PROVIDER.to_string(),
                reason: format!("API responded with status code: {} - {}", status, body),
            });
        }

        debug!("Raw completion response: {}", body);

        let parsed: PromptResponse =
            serde_json::from_str(&body).map_err(|e| GenerationError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: format!("{} - Response was: {}", e, body),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: "No choices in response".to_string(),
            })
    }
}
