//! Answers and the running transcript

use crate::error::COMPLETION_ERROR_PREFIX;
use std::fmt;

/// Outcome of one question that got as far as the completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Text shown to the person asking (model output or completion error)
    pub text: String,

    /// Completion failure description, when the service call failed
    pub failure: Option<String>,

    /// Store names the identifiers resolved to, in identifier order
    pub resolved: Vec<String>,

    /// Reports fetched and extracted while answering this question
    pub newly_fetched: Vec<String>,
}

impl Answer {
    /// Answer carrying model output
    pub fn completed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            failure: None,
            resolved: Vec::new(),
            newly_fetched: Vec::new(),
        }
    }

    /// Answer carrying a completion failure
    pub fn failed(description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            text: format!("{}{}", COMPLETION_ERROR_PREFIX, description),
            failure: Some(description),
            resolved: Vec::new(),
            newly_fetched: Vec::new(),
        }
    }

    /// Attach the names resolved and fetched for this question
    pub fn with_reports(mut self, resolved: Vec<String>, newly_fetched: Vec<String>) -> Self {
        self.resolved = resolved;
        self.newly_fetched = newly_fetched;
        self
    }

    /// Whether the completion call failed
    pub fn is_error(&self) -> bool {
        self.failure.is_some()
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Render one exchange the way the transcript shows it
pub fn format_exchange(question: &str, answer: &str) -> String {
    format!("You: {}\nBot: {}\n\n", question, answer)
}

/// Append-only record of the conversation
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<(String, String)>,
}

impl Transcript {
    /// Create an empty transcript
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one exchange
    pub fn push(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.entries.push((question.into(), answer.into()));
    }

    /// Number of exchanges
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been asked yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (question, answer) in &self.entries {
            f.write_str(&format_exchange(question, answer))?;
        }
        Ok(())
    }
}
