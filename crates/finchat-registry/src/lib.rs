//! Finchat Registry Chat
//!
//! Questions about Norwegian legal entities, answered from the public API of
//! the Brønnøysund Register Centre (`data.brreg.no`).
//!
//! # Overview
//!
//! - [`BrregClient`]: typed access to the registry endpoints
//! - [`EntityRecord`]: one flattened row of an entity search result
//! - [`export`]: CSV export of flattened records (UTF-8 with BOM, for Excel)
//! - [`RegistryChat`]: entity search + completion call, cached per entity
//!
//! # Example Usage
//!
//! ```no_run
//! use finchat_registry::{BrregClient, EntityRecord};
//!
//! # async fn example() -> Result<(), finchat_registry::RegistryError> {
//! let client = BrregClient::new();
//! let results = client.search_entities("Equinor").await?;
//! for record in EntityRecord::flatten(&results) {
//!     println!("{} {}", record.organisasjonsnummer, record.navn);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chat;
mod client;
pub mod export;
mod record;

use thiserror::Error;

pub use chat::{EntityDirectory, RegistryChat, RegistryConfig, CSV_FILE_SUFFIX};
pub use client::{BrregClient, DownloadFormat, DEFAULT_BASE_URL};
pub use record::{EntityRecord, COLUMNS};

/// Errors that can occur while talking to the registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Network or transport failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// Registry answered with something other than 200 OK
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing input; the message is meant for the person asking
    #[error("{0}")]
    Validation(String),

    /// The registry returned nothing usable for an entity name
    #[error("Could not retrieve data for {0} from brreg.")]
    NoData(String),

    /// Client misconfigured
    #[error("Configuration error: {0}")]
    Config(String),

    /// Writing an export file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Message shown to the person asking
    pub fn user_message(&self) -> String {
        match self {
            RegistryError::Validation(_) | RegistryError::NoData(_) => self.to_string(),
            other => format!("Error: {}", other),
        }
    }
}
