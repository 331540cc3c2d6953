//! Local directory document store

use crate::StoreError;
use finchat_domain::DocumentStore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Document store over the regular files of one directory
///
/// Subdirectories are ignored and names never contain path separators.
#[derive(Debug, Clone)]
pub struct LocalDirStore {
    root: PathBuf,
}

impl LocalDirStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory documents are read from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File names in the directory, sorted
    pub async fn list_files(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StoreError::Config(format!("Report directory does not exist: {}", self.root.display()))
            } else {
                StoreError::Io(e)
            }
        })?;

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();

        debug!("Found {} files in {}", names.len(), self.root.display());
        Ok(names)
    }

    /// Read one file by name
    pub async fn read_file(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(StoreError::NotFound(name.to_string()));
        }

        match tokio::fs::read(self.root.join(name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StoreError::NotFound(name.to_string())),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

impl DocumentStore for LocalDirStore {
    type Error = StoreError;

    async fn list_names(&self) -> Result<Vec<String>, Self::Error> {
        self.list_files().await
    }

    async fn fetch_bytes(&self, name: &str) -> Result<Vec<u8>, Self::Error> {
        self.read_file(name).await
    }
}
