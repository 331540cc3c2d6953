//! Finchat Report Chat
//!
//! Answers questions about annual reports kept in a document store.
//!
//! # Overview
//!
//! The person asking names one or more reports in free text
//! (`"Equinor 2020, Equinor 2021"`) and asks a question. Each name is
//! normalized into an identifier and resolved against the store's report
//! list. Reports not seen before are downloaded and their text extracted;
//! then all reports seen in this session go into a single prompt and one
//! completion call produces the answer.
//!
//! # Architecture
//!
//! ```text
//! identifiers + question → resolve → fetch/extract (new only) → SessionState
//!                                                                   ↓
//!                                      Answer ← completion ← PromptBuilder
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use finchat_chat::{ChatConfig, ReportChat};
//! use finchat_llm::{AzureOpenAiProvider, CompletionConfig};
//! use finchat_pdf::PdfExtractor;
//! use finchat_store::LocalDirStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = AzureOpenAiProvider::new(CompletionConfig::new(
//!     "https://my-resource.openai.azure.com",
//!     "api-key",
//! ))?;
//! let store = LocalDirStore::new("./reports");
//!
//! let mut chat = ReportChat::new(store, PdfExtractor::new(), provider, ChatConfig::default());
//!
//! let answer = chat
//!     .answer_question("Equinor 2020, Equinor 2021", "How did revenue change?")
//!     .await?;
//! for name in &answer.newly_fetched {
//!     println!("Extracted text from {}...", name);
//! }
//! println!("Bot: {}", answer);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chat;
mod config;
mod error;
mod prompt;
mod types;


pub use chat::ReportChat;
pub use config::{ChatConfig, DEFAULT_MAX_PROMPT_CHARS, DEFAULT_SYSTEM_INSTRUCTION};
pub use error::{ChatError, COMPLETION_ERROR_PREFIX};
pub use prompt::PromptBuilder;
pub use types::{format_exchange, Answer, Transcript};
