//! Azure OpenAI Provider Implementation
//!
//! Sends a two-message chat exchange (system instruction + user prompt) to an
//! Azure OpenAI deployment and returns the text of the first choice.
//!
//! One request per call: no streaming, no retry. Every failure is reported as
//! an [`LlmError`] and left to the caller to surface.
//!
//! # Examples
//!
//! ```no_run
//! use finchat_llm::{AzureOpenAiProvider, CompletionConfig};
//!
//! let config = CompletionConfig::new("https://my-resource.openai.azure.com", "api-key");
//! let provider = AzureOpenAiProvider::new(config).unwrap();
//! ```

use crate::config::CompletionConfig;
use crate::LlmError;
use finchat_domain::CompletionProvider;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Azure OpenAI chat-completions client
pub struct AzureOpenAiProvider {
    config: CompletionConfig,
    client: reqwest::Client,
}

/// Request body for the chat completions API
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response from the chat completions API
#[derive(Deserialize)]
struct ChatCompletionResponse {
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

/// Error envelope returned by the service on failure
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl AzureOpenAiProvider {
    /// Create a provider from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the configuration is incomplete or the
    /// HTTP client cannot be built.
    pub fn new(config: CompletionConfig) -> Result<Self, LlmError> {
        config.validate().map_err(LlmError::Config)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// The configuration this provider was built with
    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// Full chat-completions URL for the configured deployment
    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.deployment,
            self.config.api_version
        )
    }

    /// Send one chat exchange and return the first choice's text
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The service cannot be reached
    /// - The service answers with a non-success status (auth, quota, oversized input)
    /// - The response cannot be decoded or carries no text
    pub async fn send_chat(&self, system_instruction: &str, prompt: &str) -> Result<String, LlmError> {
        let url = self.completions_url();

        let request_body = ChatCompletionRequest {
            model: &self.config.deployment,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        info!(
            "Requesting completion from deployment '{}' ({} prompt chars)",
            self.config.deployment,
            prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = service_message(&body);
            warn!("Completion request failed with HTTP {}", status.as_u16());

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(LlmError::RateLimitExceeded(message));
            }
            return Err(LlmError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)?;

        debug!("Completion length: {} chars", content.len());
        Ok(content)
    }
}

impl CompletionProvider for AzureOpenAiProvider {
    type Error = LlmError;

    async fn complete(&self, system_instruction: &str, prompt: &str) -> Result<String, Self::Error> {
        self.send_chat(system_instruction, prompt).await
    }
}

/// Pull the human-readable message out of an error body, falling back to the raw text
fn service_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(endpoint: &str) -> AzureOpenAiProvider {
        AzureOpenAiProvider::new(CompletionConfig::new(endpoint, "key")).unwrap()
    }

    #[test]
    fn test_provider_rejects_invalid_config() {
        let result = AzureOpenAiProvider::new(CompletionConfig::default());
        assert!(matches!(result, Err(LlmError::Config(_))));
    }

    #[test]
    fn test_completions_url() {
        let provider = provider("https://res.openai.azure.com/");
        assert_eq!(
            provider.completions_url(),
            "https://res.openai.azure.com/openai/deployments/GPT4o-API/chat/completions?api-version=2023-05-15"
        );
    }

    #[test]
    fn test_service_message_from_envelope() {
        let body = r#"{"error":{"code":"401","message":"Access denied due to invalid subscription key."}}"#;
        assert_eq!(
            service_message(body),
            "Access denied due to invalid subscription key."
        );
    }

    #[test]
    fn test_service_message_falls_back_to_body() {
        assert_eq!(service_message("  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatCompletionRequest {
            model: "GPT4o-API",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "hi",
                },
            ],
            max_tokens: 1000,
            temperature: 0.3,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert_eq!(value["max_tokens"], 1000);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_communication_error() {
        let provider = provider("http://127.0.0.1:9");
        let result = provider.send_chat("sys", "test").await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
