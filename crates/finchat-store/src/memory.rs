//! In-memory document store for tests and demos

use crate::StoreError;
use finchat_domain::DocumentStore;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory document store that records every call
///
/// Clones share state, so a test can keep one handle and give another to the
/// code under test.
///
/// # Examples
///
/// ```
/// use finchat_store::MemoryStore;
///
/// let store = MemoryStore::new()
///     .with_document("acme-2020.pdf", "Revenue was 10")
///     .with_document("acme-2021.pdf", "Revenue was 12");
/// assert_eq!(store.fetch_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    fetches: Arc<Mutex<Vec<String>>>,
    listings: Arc<Mutex<usize>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document (builder style)
    pub fn with_document(self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// Add or replace a document; listing order is first-insertion order
    pub fn insert(&self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let name = name.into();
        let bytes = bytes.into();
        let mut documents = lock(&self.documents);
        match documents.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = bytes,
            None => documents.push((name, bytes)),
        }
    }

    /// Make every fetch of `name` fail
    pub fn fail_fetch(&self, name: impl Into<String>) {
        lock(&self.failing).insert(name.into());
    }

    /// Names fetched so far, in call order (failed fetches included)
    pub fn fetched(&self) -> Vec<String> {
        lock(&self.fetches).clone()
    }

    /// Number of fetch calls made so far
    pub fn fetch_count(&self) -> usize {
        lock(&self.fetches).len()
    }

    /// Number of list calls made so far
    pub fn list_count(&self) -> usize {
        *lock(&self.listings)
    }
}

impl DocumentStore for MemoryStore {
    type Error = StoreError;

    async fn list_names(&self) -> Result<Vec<String>, Self::Error> {
        *lock(&self.listings) += 1;
        Ok(lock(&self.documents).iter().map(|(name, _)| name.clone()).collect())
    }

    async fn fetch_bytes(&self, name: &str) -> Result<Vec<u8>, Self::Error> {
        lock(&self.fetches).push(name.to_string());

        if lock(&self.failing).contains(name) {
            return Err(StoreError::Other(format!("injected failure for {}", name)));
        }

        lock(&self.documents)
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let store = MemoryStore::new()
            .with_document("z.pdf", "z")
            .with_document("a.pdf", "a");
        assert_eq!(store.list_names().await.unwrap(), vec!["z.pdf", "a.pdf"]);
        assert_eq!(store.list_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_records_calls() {
        let store = MemoryStore::new().with_document("a.pdf", "text");
        let handle = store.clone();

        assert_eq!(store.fetch_bytes("a.pdf").await.unwrap(), b"text");
        assert!(matches!(
            store.fetch_bytes("b.pdf").await,
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(handle.fetched(), vec!["a.pdf", "b.pdf"]);
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = MemoryStore::new().with_document("a.pdf", "text");
        store.fail_fetch("a.pdf");
        assert!(matches!(store.fetch_bytes("a.pdf").await, Err(StoreError::Other(_))));
    }

    #[test]
    fn test_insert_replaces_existing() {
        let store = MemoryStore::new().with_document("a.pdf", "old");
        store.insert("a.pdf", "new");
        assert_eq!(lock(&store.documents).len(), 1);
        assert_eq!(lock(&store.documents)[0].1, b"new".to_vec());
    }
}
