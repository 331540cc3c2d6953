//! Finchat Domain Layer
//!
//! Core vocabulary for the report question-answering workflow. Like every
//! domain crate in this workspace it has no external dependencies: it defines
//! the value types and the trait seams that the infrastructure crates
//! (`finchat-store`, `finchat-pdf`, `finchat-llm`) implement.
//!
//! ## Key Concepts
//!
//! - **ReportIdentifier**: normalized key derived from free text like `"Equinor 2020"`
//! - **Identifier resolution**: case-insensitive substring match against store names
//! - **SessionState**: reports already fetched and extracted during this run
//! - **Collaborator traits**: document store, text extractor, completion provider

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod report;
pub mod session;
pub mod traits;

// Re-exports for convenience
pub use report::{normalize_identifiers, resolve, ReportIdentifier, DEFAULT_DOCUMENT_SUFFIX};
pub use session::{ReportText, SessionState};
pub use traits::{CompletionProvider, DocumentStore, TextExtractor};
