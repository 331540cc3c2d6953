//! Configuration for the completion client

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Azure OpenAI deployment name
pub const DEFAULT_DEPLOYMENT: &str = "GPT4o-API";

/// Default Azure OpenAI REST API version
pub const DEFAULT_API_VERSION: &str = "2023-05-15";

/// Default cap on generated tokens
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

/// Connection and sampling settings for the completion service
///
/// Sampling temperature and output cap are fixed per process; they are not
/// runtime parameters of a single call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: String,

    /// API key sent in the `api-key` header
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,

    /// Deployment (model) name
    pub deployment: String,

    /// REST API version query parameter
    pub api_version: String,

    /// Maximum number of tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f64,

    /// Request timeout; transport default when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl CompletionConfig {
    /// Create a configuration for an endpoint and key with default sampling
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Get the request timeout as a Duration, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("endpoint must be set".to_string());
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(format!("endpoint must be an http(s) URL: {}", self.endpoint));
        }
        if self.api_key.trim().is_empty() {
            return Err("api_key must be set".to_string());
        }
        if self.deployment.trim().is_empty() {
            return Err("deployment must be set".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be between 0.0 and 2.0".to_string());
        }
        if self.timeout_secs == Some(0) {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            deployment: DEFAULT_DEPLOYMENT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: None,
        }
    }
}
