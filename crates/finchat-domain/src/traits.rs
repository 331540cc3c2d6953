//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the question-answering workflow
//! and infrastructure. Implementations live in other crates.

use std::future::Future;

/// Source of raw report documents
///
/// Implemented by the infrastructure layer (finchat-store)
pub trait DocumentStore {
    /// Error type for store operations
    type Error;

    /// List the names of every available document
    fn list_names(&self) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send;

    /// Fetch the raw bytes of one document
    fn fetch_bytes(&self, name: &str) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send;
}

/// Converter from raw document bytes to plain text
///
/// Implemented by the infrastructure layer (finchat-pdf)
pub trait TextExtractor {
    /// Error type for extraction
    type Error;

    /// Extract the text of every page, in document order
    fn extract(&self, bytes: &[u8]) -> Result<String, Self::Error>;
}

/// Hosted chat-completion model
///
/// Implemented by the infrastructure layer (finchat-llm)
pub trait CompletionProvider {
    /// Error type for completion calls
    type Error;

    /// Send a system instruction and a user prompt, return the first choice's text
    fn complete(
        &self,
        system_instruction: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}
