// src/llm/openai.rs
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::llm::TextModel;
use crate::utils::error::ModelError;

/// Retry budget for transient transport failures (connect errors, 429, 5xx).
/// Timeouts and semantic failures are never retried: a repeated model call is
/// not idempotent and must not be assumed safe to fire blindly.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Client for an OpenAI-compatible chat-completions endpoint with
/// deterministic decoding (temperature 0) and a bounded wait.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model_id: String,
    timeout_secs: u64,
    max_retries: u32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model_id: config.model_id.clone(),
            timeout_secs: config.timeout_secs,
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl TextModel for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let url = self.completions_url();
        let request_body = ChatRequest {
            model: &self.model_id,
            temperature: 0.0,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            match self
                .http
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let parsed: ChatResponse = response.json().await.map_err(|e| {
                            ModelError::InvalidResponse(format!("Failed to decode reply: {}", e))
                        })?;
                        let content = parsed
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|choice| choice.message.content)
                            .ok_or_else(|| {
                                ModelError::InvalidResponse("Reply carried no content".to_string())
                            })?;
                        return Ok(content);
                    }

                    let retryable = status == reqwest::StatusCode::TOO_MANY_REQUESTS
                        || status.is_server_error();
                    let body = response.text().await.unwrap_or_default();
                    if !retryable {
                        return Err(ModelError::Http { status, body });
                    }
                    tracing::warn!("Transient model HTTP error {}; will retry", status);
                    last_error = Some(ModelError::Http { status, body });
                }
                Err(e) if e.is_timeout() => {
                    return Err(ModelError::Timeout(self.timeout_secs));
                }
                Err(e) => {
                    tracing::warn!("Model transport error: {}; will retry", e);
                    last_error = Some(ModelError::Transport(e.to_string()));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, ...
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| ModelError::Transport("Retry budget exhausted".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ModelConfig {
        ModelConfig {
            api_key: "test-key".to_string(),
            base_url: "https://api.openai.com/v1/".to_string(),
            model_id: "gpt-4o-mini".to_string(),
            timeout_secs: 180,
        }
    }

    #[test]
    fn test_completions_url_joins_cleanly() {
        let client = OpenAiClient::new(&test_config()).unwrap();
        assert_eq!(
            client.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let config = ModelConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..test_config()
        };
        let client = OpenAiClient::new(&config).unwrap().with_max_retries(1);

        let result = client.generate("test").await;
        assert!(matches!(result, Err(ModelError::Transport(_))));
    }
}
