// src/services/openai.rs
use crate::services::settings::SettingsService;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum OpenAIError {
    #[error("API key not configured")]
    NotConfigured,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Settings error: {0}")]
    SettingsError(String),
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

/// Chat-completion client for the hosted language model
///
/// Constructed once at startup and injected through `AppState`. Every failure
/// mode (missing key, network error, rate limit, malformed reply) surfaces as
/// an `OpenAIError`; pipeline consumers treat all of them uniformly by
/// switching to their deterministic fallback.
#[derive(Debug)]
pub struct OpenAiService {
    settings_service: Arc<SettingsService>,
    client: Client,
}

impl OpenAiService {
    /// Takes the shared HTTP client built at startup; the caller owns
    /// timeout and proxy policy
    pub fn new(settings_service: Arc<SettingsService>, client: Client) -> Self {
        Self {
            settings_service,
            client,
        }
    }

    /// Get OpenAI configuration from settings
    pub async fn get_config(&self) -> Result<OpenAiConfig, OpenAIError> {
        let api_key = self
            .settings_service
            .get_setting("openai_api_key")
            .await
            .map_err(|e| OpenAIError::SettingsError(e.to_string()))?
            .ok_or(OpenAIError::NotConfigured)?;

        let base_url = self
            .settings_service
            .get_setting("openai_base_url")
            .await
            .map_err(|e| OpenAIError::SettingsError(e.to_string()))?
            .unwrap_or_else(|| "https://api.openai.com".to_string());

        let model = self
            .settings_service
            .get_setting("openai_model")
            .await
            .map_err(|e| OpenAIError::SettingsError(e.to_string()))?
            .unwrap_or_else(|| "gpt-4o-mini".to_string());

        Ok(OpenAiConfig {
            api_key,
            base_url,
            model,
        })
    }

    /// Run a single chat completion and return the reply text
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, OpenAIError> {
        let config = self.get_config().await?;

        let request = ChatCompletionRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_prompt.to_string(),
                },
            ],
            temperature,
            max_tokens,
        };

        debug!(
            model = %config.model,
            temperature = temperature,
            max_tokens = max_tokens,
            "Sending chat completion request"
        );

        let response = self.make_request_with_retry(&config, request).await?;

        let reply = response
            .choices
            .first()
            .ok_or_else(|| OpenAIError::InvalidResponse("No choices in response".to_string()))?
            .message
            .content
            .clone();

        if reply.trim().is_empty() {
            return Err(OpenAIError::InvalidResponse(
                "Empty completion content".to_string(),
            ));
        }

        if let Some(usage) = response.usage {
            info!(
                model = %config.model,
                tokens_used = usage.total_tokens,
                "Chat completion finished"
            );
        }

        Ok(reply)
    }

    /// Make API request with bounded retry before the error escapes to the
    /// consumer's fallback path
    async fn make_request_with_retry(
        &self,
        config: &OpenAiConfig,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, OpenAIError> {
        let max_retries = 3;
        let mut last_error = None;

        for attempt in 1..=max_retries {
            match self.make_request(config, &request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(
                        attempt = attempt,
                        max_retries = max_retries,
                        error = %e,
                        "OpenAI API request failed, retrying..."
                    );
                    last_error = Some(e);

                    // Exponential backoff
                    if attempt < max_retries {
                        let delay = std::time::Duration::from_millis(1000 * 2_u64.pow(attempt - 1));
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| OpenAIError::RequestFailed("Unknown error".to_string())))
    }

    /// Make a single API request
    async fn make_request(
        &self,
        config: &OpenAiConfig,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, OpenAIError> {
        let url = format!(
            "{}/v1/chat/completions",
            config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", config.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| OpenAIError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(OpenAIError::RateLimitExceeded);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "OpenAI API request failed");
            return Err(OpenAIError::RequestFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| OpenAIError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_constructed_with_shared_client() {
        // The service takes the startup client instead of building its own
        let pool = SqlitePoolOptions::new()
            .connect_lazy("sqlite::memory:")
            .unwrap();
        let settings = Arc::new(SettingsService::new(pool));
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();
        let _service = OpenAiService::new(settings, client);
    }

    #[test]
    fn test_request_serialization_shape() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "be terse".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: "hello".to_string(),
                },
            ],
            temperature: 0.2,
            max_tokens: 3000,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hello");
        assert_eq!(value["max_tokens"], 3000);
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "id": "chatcmpl-1",
            "choices": [{"message": {"role": "assistant", "content": "{}"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices.len(), 1);
        assert_eq!(parsed.choices[0].message.content, "{}");
        assert_eq!(parsed.usage.unwrap().total_tokens, 12);
    }
}
