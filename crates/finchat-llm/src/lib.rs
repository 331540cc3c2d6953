//! Finchat Completion Layer
//!
//! Implementations of the `CompletionProvider` trait from `finchat-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing, records every prompt
//! - `AzureOpenAiProvider`: Azure OpenAI chat completions over HTTPS
//!
//! # Examples
//!
//! ```
//! use finchat_llm::MockProvider;
//! use finchat_domain::CompletionProvider;
//!
//! let provider = MockProvider::new("Revenue grew 4%.");
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! let answer = runtime.block_on(provider.complete("system", "question")).unwrap();
//! assert_eq!(answer, "Revenue grew 4%.");
//! assert_eq!(provider.call_count(), 1);
//! ```

#![warn(missing_docs)]

pub mod azure;
pub mod config;

use finchat_domain::CompletionProvider;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use azure::AzureOpenAiProvider;
pub use config::CompletionConfig;

/// Errors that can occur during completion calls
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or transport failure before a response arrived
    #[error("Communication error: {0}")]
    Communication(String),

    /// Service answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Service-provided error message, or the raw body
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Response decoded but carried no choice text
    #[error("Response contained no completion text")]
    EmptyResponse,

    /// Provider misconfigured (missing endpoint or key, bad values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// One recorded call to the mock provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// System instruction that was sent
    pub system_instruction: String,
    /// User prompt that was sent
    pub prompt: String,
}

/// Mock completion provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls and
/// records every call so tests can inspect the prompts that were built.
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    failure: Option<LlmError>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            failure: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a MockProvider whose every call fails with `error`
    pub fn failing(error: LlmError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        lock(&self.responses).insert(prompt.into(), response.into());
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// All calls made so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// The prompt of the most recent call
    pub fn last_prompt(&self) -> Option<String> {
        lock(&self.calls).last().map(|call| call.prompt.clone())
    }

    /// Reset the recorded calls
    pub fn reset_calls(&self) {
        lock(&self.calls).clear();
    }

    fn respond(&self, system_instruction: &str, prompt: &str) -> Result<String, LlmError> {
        lock(&self.calls).push(RecordedCall {
            system_instruction: system_instruction.to_string(),
            prompt: prompt.to_string(),
        });

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        if let Some(response) = lock(&self.responses).get(prompt) {
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl CompletionProvider for MockProvider {
    type Error = LlmError;

    async fn complete(&self, system_instruction: &str, prompt: &str) -> Result<String, Self::Error> {
        self.respond(system_instruction, prompt)
    }
}

// A panicking test thread must not poison the mock for the rest of the suite.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.complete("system", "any prompt").await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");

        assert_eq!(provider.complete("s", "hello").await.unwrap(), "world");
        assert_eq!(
            provider.complete("s", "unknown").await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_mock_provider_records_calls() {
        let provider = MockProvider::new("ok");
        assert_eq!(provider.call_count(), 0);

        provider.complete("sys-1", "prompt-1").await.unwrap();
        provider.complete("sys-2", "prompt-2").await.unwrap();

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].system_instruction, "sys-1");
        assert_eq!(provider.last_prompt().as_deref(), Some("prompt-2"));

        provider.reset_calls();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_failing() {
        let provider = MockProvider::failing(LlmError::RateLimitExceeded("slow down".into()));
        let result = provider.complete("s", "p").await;
        assert_eq!(result, Err(LlmError::RateLimitExceeded("slow down".into())));
        // failed calls are still recorded
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_calls() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete("s", "p").await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[test]
    fn test_status_error_display() {
        let err = LlmError::Status {
            status: 401,
            message: "Access denied".into(),
        };
        assert_eq!(err.to_string(), "HTTP 401: Access denied");
    }
}
