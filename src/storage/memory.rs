//! In-memory blob backend.
//!
//! Thread-safe map of blob name to serialized contents. It is the embedded
//! default and the fake the test-suite runs against.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::storage::traits::{BlobStore, StorageError};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

/// Thread-safe in-memory blob store.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl InMemoryBlobStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with raw blob contents.
    #[must_use]
    pub fn with_blobs<I, K, V>(blobs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            blobs: RwLock::new(
                blobs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Names of the blobs currently held, sorted.
    pub fn blob_names(&self) -> Result<Vec<String>, StorageError> {
        let blobs = self.blobs.read().map_err(|_| lock_err("blob.names"))?;
        let mut names: Vec<String> = blobs.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl BlobStore for InMemoryBlobStore {
    fn get(&self, name: &str) -> Result<Option<String>, StorageError> {
        let blobs = self.blobs.read().map_err(|_| lock_err("blob.get"))?;
        Ok(blobs.get(name).cloned())
    }

    fn set(&self, name: &str, data: &str) -> Result<(), StorageError> {
        let mut blobs = self.blobs.write().map_err(|_| lock_err("blob.set"))?;
        blobs.insert(name.to_string(), data.to_string());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StorageError> {
        let mut blobs = self.blobs.write().map_err(|_| lock_err("blob.remove"))?;
        blobs.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_set_get_overwrite_remove() {
        let store = InMemoryBlobStore::new();
        assert!(store.get("persons").unwrap().is_none());

        store.set("persons", "{}").unwrap();
        assert_eq!(store.get("persons").unwrap().as_deref(), Some("{}"));

        store.set("persons", r#"{"a":1}"#).unwrap();
        assert_eq!(store.get("persons").unwrap().as_deref(), Some(r#"{"a":1}"#));

        store.remove("persons").unwrap();
        assert!(store.get("persons").unwrap().is_none());

        // Removing again is fine.
        store.remove("persons").unwrap();
    }

    #[test]
    fn seeded_store_lists_names() {
        let store = InMemoryBlobStore::with_blobs([("companies", "{}"), ("persons", "{}")]);
        assert_eq!(store.blob_names().unwrap(), vec!["companies", "persons"]);
    }
}
