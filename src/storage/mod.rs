//! Persistence port and its backends.
//!
//! The trait lives in `traits`; `memory` is always available and
//! `persistent` is compiled with the `persistent` feature.

mod memory;
#[cfg(feature = "persistent")]
mod persistent;
mod traits;

pub use memory::InMemoryBlobStore;
#[cfg(feature = "persistent")]
pub use persistent::FileBlobStore;
pub use traits::{BlobStore, StorageError};
