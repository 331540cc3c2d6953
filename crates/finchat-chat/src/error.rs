//! Error types for the report chat

use thiserror::Error;

/// Prefix of every answer that carries a completion failure instead of model text
pub const COMPLETION_ERROR_PREFIX: &str = "Error with OpenAI API: ";

/// Errors that end a question before an answer is produced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Identifier list or question missing
    #[error("missing identifiers or question")]
    Validation,

    /// No identifier matched a report in the store
    #[error("no matching reports")]
    NotFound,

    /// The store's report list could not be loaded
    #[error("Failed to list reports: {0}")]
    Catalog(String),

    /// A report could not be fetched, saved or extracted
    #[error("Failed to retrieve {report}: {reason}")]
    Retrieval {
        /// Store name of the report
        report: String,
        /// What went wrong
        reason: String,
    },

    /// Assembled prompt exceeds the configured limit
    #[error("Prompt too long: {0} chars (max: {1})")]
    PromptTooLarge(usize, usize),
}

impl ChatError {
    /// Message shown to the person asking
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Validation => {
                "Please enter at least one company name, year, and a question.".to_string()
            }
            ChatError::NotFound => "No matching reports found.".to_string(),
            other => format!("Error: {}", other),
        }
    }
}
