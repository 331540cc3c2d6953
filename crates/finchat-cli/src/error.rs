//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Completion service error
    #[error("Completion error: {0}")]
    Llm(#[from] finchat_llm::LlmError),

    /// Document store error
    #[error("Store error: {0}")]
    Store(#[from] finchat_store::StoreError),

    /// Report chat error
    #[error(transparent)]
    Chat(#[from] finchat_chat::ChatError),

    /// Registry error
    #[error(transparent)]
    Registry(#[from] finchat_registry::RegistryError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Message printed before exiting
    ///
    /// Chat and registry errors carry their own wording for the person asking.
    pub fn user_message(&self) -> String {
        match self {
            CliError::Chat(e) => e.user_message(),
            CliError::Registry(e) => e.user_message(),
            other => format!("Error: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finchat_chat::ChatError;

    #[test]
    fn test_chat_errors_keep_their_wording() {
        let err = CliError::from(ChatError::NotFound);
        assert_eq!(err.user_message(), "No matching reports found.");
    }

    #[test]
    fn test_other_errors_are_prefixed() {
        let err = CliError::Config("missing endpoint".to_string());
        assert_eq!(err.user_message(), "Error: Configuration error: missing endpoint");
    }
}
