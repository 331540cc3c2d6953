//! Finchat Document Stores
//!
//! Implementations of the `DocumentStore` trait from `finchat-domain`.
//!
//! # Stores
//!
//! - `AzureBlobStore`: one Azure Blob Storage container, accessed with a SAS token
//! - `LocalDirStore`: every file in one local directory
//! - `MemoryStore`: in-memory documents with a fetch log, for tests
//! - `ConfiguredStore`: runtime choice between the Azure and local stores

#![warn(missing_docs)]

pub mod azure;
pub mod local;
mod memory;
mod shared_key;

use finchat_domain::DocumentStore;
use thiserror::Error;

pub use azure::AzureBlobStore;
pub use local::LocalDirStore;
pub use memory::MemoryStore;

/// Errors that can occur while listing or fetching documents
#[derive(Error, Debug)]
pub enum StoreError {
    /// The named document does not exist
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Network or transport failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// Service answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Container listing could not be parsed
    #[error("Invalid listing: {0}")]
    InvalidListing(String),

    /// Store misconfigured
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure injected by a test double
    #[error("Store error: {0}")]
    Other(String),
}

/// Store selected at runtime from configuration
pub enum ConfiguredStore {
    /// Azure Blob Storage container
    Azure(AzureBlobStore),
    /// Local directory
    Local(LocalDirStore),
}

impl ConfiguredStore {
    /// Short human-readable description of where documents come from
    pub fn describe(&self) -> String {
        match self {
            ConfiguredStore::Azure(store) => format!("azure container {}", store.container_url()),
            ConfiguredStore::Local(store) => format!("directory {}", store.root().display()),
        }
    }
}

impl DocumentStore for ConfiguredStore {
    type Error = StoreError;

    async fn list_names(&self) -> Result<Vec<String>, Self::Error> {
        match self {
            ConfiguredStore::Azure(store) => store.list_blobs().await,
            ConfiguredStore::Local(store) => store.list_files().await,
        }
    }

    async fn fetch_bytes(&self, name: &str) -> Result<Vec<u8>, Self::Error> {
        match self {
            ConfiguredStore::Azure(store) => store.download_blob(name).await,
            ConfiguredStore::Local(store) => store.read_file(name).await,
        }
    }
}
