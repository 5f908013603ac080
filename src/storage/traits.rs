//! Abstract persistence port for careergraph.
//!
//! The entity store never touches a filesystem, browser storage or database
//! directly. It reads and writes whole serialized maps ("blobs") by name
//! through this trait, which lets tests run against an in-memory fake and
//! lets hosts plug in whatever durable medium they have.

use thiserror::Error;

/// Errors reported by a [`BlobStore`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The stored bytes for a blob failed an integrity check.
    #[error("Blob '{blob}' is corrupted: {reason}")]
    BlobCorrupted {
        /// Blob name.
        blob: String,
        /// What the integrity check found.
        reason: String,
    },

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Returns true if the backend reported corrupted contents rather than
    /// an access failure.
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(self, Self::BlobCorrupted { .. })
    }
}

/// Key/value port holding serialized maps by blob name.
///
/// Implementations only need last-writer-wins semantics per blob; the store
/// layers its own two-blob commit protocol on top.
pub trait BlobStore: Send + Sync {
    /// Read a blob. `Ok(None)` means the blob was never written.
    fn get(&self, name: &str) -> Result<Option<String>, StorageError>;

    /// Replace a blob's contents.
    fn set(&self, name: &str, data: &str) -> Result<(), StorageError>;

    /// Remove a blob. Removing a missing blob is not an error.
    fn remove(&self, name: &str) -> Result<(), StorageError>;
}
