//! Error types for careergraph.
//!
//! Normalization, key resolution and graph building are total and never
//! fail. Everything that reads or writes the persistence port returns a
//! [`StoreError`].

use thiserror::Error;

use crate::storage::StorageError;

/// Top-level error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Blob '{blob}' could not be parsed: {reason}")]
    CorruptBlob {
        blob: String,
        reason: String,
    },

    #[error("Failed to serialize blob '{blob}': {message}")]
    Serialization {
        blob: String,
        message: String,
    },

    #[error("Name '{name}' normalizes to an empty key")]
    EmptyName {
        name: String,
    },

    #[error("Commit failed writing blob '{blob}' (rolled back: {rolled_back}): {source}")]
    CommitFailed {
        blob: String,
        rolled_back: bool,
        #[source]
        source: StorageError,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },

    #[error("Invalid import payload: {reason}")]
    InvalidImport {
        reason: String,
    },
}

impl StoreError {
    /// Creates a configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Returns true if the persistence port itself failed.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::CommitFailed { .. })
    }

    /// Returns true if persisted data could not be read back.
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        match self {
            Self::CorruptBlob { .. } => true,
            Self::Storage(e) => e.is_corruption(),
            _ => false,
        }
    }

    /// Returns true if retrying the same call may succeed.
    ///
    /// Only backend access failures qualify; a cleanly rolled-back commit
    /// left both blobs untouched and can be retried as-is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(e) => matches!(e, StorageError::BackendError(_) | StorageError::Io(_)),
            Self::CommitFailed { rolled_back, .. } => *rolled_back,
            _ => false,
        }
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
