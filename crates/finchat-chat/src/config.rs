//! Configuration for the report chat

use finchat_domain::DEFAULT_DOCUMENT_SUFFIX;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// System instruction sent with every completion request
pub const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant analyzing financial reports.";

/// Default ceiling on the assembled prompt, in characters
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 400_000;

/// Configuration for [`ReportChat`](crate::ReportChat)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Suffix appended to every normalized identifier
    pub document_suffix: String,

    /// Largest prompt (characters) sent to the completion service
    pub max_prompt_chars: usize,

    /// System instruction for the completion service
    pub system_instruction: String,

    /// When set, every fetched document is also saved here as `downloaded_{name}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            document_suffix: DEFAULT_DOCUMENT_SUFFIX.to_string(),
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            download_dir: None,
        }
    }
}

impl ChatConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.document_suffix.chars().any(|c| c.is_whitespace() || c == ',') {
            return Err("document_suffix cannot contain whitespace or commas".to_string());
        }
        if self.max_prompt_chars == 0 {
            return Err("max_prompt_chars must be greater than 0".to_string());
        }
        if self.system_instruction.trim().is_empty() {
            return Err("system_instruction cannot be empty".to_string());
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
