//! Two-blob commit with rollback.
//!
//! Persons and companies live in separate blobs, but every mutation that
//! touches one usually touches the other (stubs, merge repointing). A
//! commit writes persons first, then companies; if the second write fails
//! the persons blob is put back to what it was before the commit.

use crate::config::BlobNames;
use crate::error::{StoreError, StoreResult};
use crate::state::GraphState;
use crate::storage::{BlobStore, StorageError};

/// Serialized contents of the two entity blobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EncodedMaps {
    pub persons: String,
    pub companies: String,
}

impl EncodedMaps {
    /// Serializes both maps of `state`.
    pub fn encode(state: &GraphState, names: &BlobNames) -> StoreResult<Self> {
        Ok(Self {
            persons: serialize(&state.persons, &names.persons)?,
            companies: serialize(&state.companies, &names.companies)?,
        })
    }
}

fn serialize<T: serde::Serialize>(value: &T, blob: &str) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|e| StoreError::Serialization {
        blob: blob.to_string(),
        message: e.to_string(),
    })
}

/// Writes both blobs or neither.
///
/// # Errors
/// `Storage` if the previous persons blob cannot be read (nothing was
/// written). `CommitFailed` if a write fails; `rolled_back` reports whether
/// the port was returned to its pre-commit contents.
pub(crate) fn commit(port: &dyn BlobStore, names: &BlobNames, maps: &EncodedMaps) -> StoreResult<()> {
    let previous_persons = port.get(&names.persons)?;

    port.set(&names.persons, &maps.persons)
        .map_err(|source| StoreError::CommitFailed {
            blob: names.persons.clone(),
            rolled_back: true,
            source,
        })?;

    if let Err(source) = port.set(&names.companies, &maps.companies) {
        tracing::warn!(blob = %names.companies, error = %source, "commit failed, rolling back");
        let rolled_back = match restore(port, &names.persons, previous_persons.as_deref()) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(blob = %names.persons, error = %e, "rollback failed");
                false
            }
        };
        return Err(StoreError::CommitFailed {
            blob: names.companies.clone(),
            rolled_back,
            source,
        });
    }

    Ok(())
}

/// Removes both blobs or neither.
///
/// # Errors
/// Same as [`commit`]: the persons blob is restored if removing companies
/// fails.
pub(crate) fn clear(port: &dyn BlobStore, names: &BlobNames) -> StoreResult<()> {
    let previous_persons = port.get(&names.persons)?;

    port.remove(&names.persons)
        .map_err(|source| StoreError::CommitFailed {
            blob: names.persons.clone(),
            rolled_back: true,
            source,
        })?;

    if let Err(source) = port.remove(&names.companies) {
        tracing::warn!(blob = %names.companies, error = %source, "clear failed, rolling back");
        let rolled_back = match restore(port, &names.persons, previous_persons.as_deref()) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(blob = %names.persons, error = %e, "rollback failed");
                false
            }
        };
        return Err(StoreError::CommitFailed {
            blob: names.companies.clone(),
            rolled_back,
            source,
        });
    }

    Ok(())
}

fn restore(port: &dyn BlobStore, name: &str, previous: Option<&str>) -> Result<(), StorageError> {
    match previous {
        Some(data) => port.set(name, data),
        None => port.remove(name),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::storage::InMemoryBlobStore;

    /// Delegates to memory but refuses writes and removes of one blob while
    /// armed, and optionally every remove.
    struct FailingWrites {
        inner: InMemoryBlobStore,
        blob: &'static str,
        armed: AtomicBool,
        fail_restore: bool,
    }

    impl FailingWrites {
        fn new(blob: &'static str) -> Self {
            Self {
                inner: InMemoryBlobStore::new(),
                blob,
                armed: AtomicBool::new(false),
                fail_restore: false,
            }
        }
    }

    impl BlobStore for FailingWrites {
        fn get(&self, name: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(name)
        }

        fn set(&self, name: &str, data: &str) -> Result<(), StorageError> {
            if self.armed.load(Ordering::SeqCst) && name == self.blob {
                return Err(StorageError::BackendError("disk full".to_string()));
            }
            self.inner.set(name, data)
        }

        fn remove(&self, name: &str) -> Result<(), StorageError> {
            if self.fail_restore || (self.armed.load(Ordering::SeqCst) && name == self.blob) {
                return Err(StorageError::BackendError("read-only".to_string()));
            }
            self.inner.remove(name)
        }
    }

    fn maps(persons: &str, companies: &str) -> EncodedMaps {
        EncodedMaps {
            persons: persons.to_string(),
            companies: companies.to_string(),
        }
    }

    #[test]
    fn commit_writes_both_blobs() {
        let port = InMemoryBlobStore::new();
        let names = BlobNames::default();
        commit(&port, &names, &maps("{\"p\":1}", "{\"c\":1}")).unwrap();
        assert_eq!(port.get("persons").unwrap().as_deref(), Some("{\"p\":1}"));
        assert_eq!(port.get("companies").unwrap().as_deref(), Some("{\"c\":1}"));
    }

    #[test]
    fn companies_failure_restores_previous_persons() {
        let port = FailingWrites::new("companies");
        let names = BlobNames::default();
        commit(&port, &names, &maps("old-p", "old-c")).unwrap();

        port.armed.store(true, Ordering::SeqCst);
        let err = commit(&port, &names, &maps("new-p", "new-c")).unwrap_err();
        assert!(matches!(err, StoreError::CommitFailed { rolled_back: true, ref blob, .. } if blob == "companies"));
        assert_eq!(port.get("persons").unwrap().as_deref(), Some("old-p"));
        assert_eq!(port.get("companies").unwrap().as_deref(), Some("old-c"));
    }

    #[test]
    fn companies_failure_on_first_commit_removes_persons() {
        let port = FailingWrites::new("companies");
        port.armed.store(true, Ordering::SeqCst);
        let err = commit(&port, &BlobNames::default(), &maps("p", "c")).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(port.get("persons").unwrap(), None);
    }

    #[test]
    fn persons_failure_writes_nothing() {
        let port = FailingWrites::new("persons");
        port.armed.store(true, Ordering::SeqCst);
        let err = commit(&port, &BlobNames::default(), &maps("p", "c")).unwrap_err();
        assert!(matches!(err, StoreError::CommitFailed { ref blob, .. } if blob == "persons"));
        assert_eq!(port.get("companies").unwrap(), None);
    }

    #[test]
    fn failed_rollback_is_reported() {
        let mut port = FailingWrites::new("companies");
        port.fail_restore = true;
        port.armed.store(true, Ordering::SeqCst);
        let err = commit(&port, &BlobNames::default(), &maps("p", "c")).unwrap_err();
        assert!(matches!(err, StoreError::CommitFailed { rolled_back: false, .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn clear_removes_both_blobs() {
        let port = InMemoryBlobStore::new();
        let names = BlobNames::default();
        commit(&port, &names, &maps("p", "c")).unwrap();
        clear(&port, &names).unwrap();
        assert_eq!(port.get("persons").unwrap(), None);
        assert_eq!(port.get("companies").unwrap(), None);
    }

    #[test]
    fn clear_restores_persons_when_companies_removal_fails() {
        let port = FailingWrites::new("companies");
        let names = BlobNames::default();
        commit(&port, &names, &maps("old-p", "old-c")).unwrap();

        port.armed.store(true, Ordering::SeqCst);
        let err = clear(&port, &names).unwrap_err();
        assert!(matches!(err, StoreError::CommitFailed { rolled_back: true, ref blob, .. } if blob == "companies"));
        assert_eq!(port.get("persons").unwrap().as_deref(), Some("old-p"));
        assert_eq!(port.get("companies").unwrap().as_deref(), Some("old-c"));
    }
}
