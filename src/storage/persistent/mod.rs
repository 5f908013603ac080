//! File-backed blob store.
//!
//! One file per blob under a root directory, each framed by [`codec`] with a
//! CRC32 so torn or bit-flipped files are reported as corruption instead of
//! being parsed as an empty or partial graph.
//!
//! Writes go to `<name>.blob.tmp` and are renamed over `<name>.blob`, so a
//! crash mid-write leaves the previous contents in place.

mod codec;

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::storage::traits::{BlobStore, StorageError};

const BLOB_EXTENSION: &str = "blob";

/// Durable [`BlobStore`] writing framed files to a directory.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
    sync_on_write: bool,
}

impl FileBlobStore {
    /// Open (creating if needed) a blob directory.
    ///
    /// # Errors
    /// Returns `Io` if the directory cannot be created.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            sync_on_write: true,
        })
    }

    /// Skip `fsync` after each write (faster, less durable).
    #[must_use]
    pub fn without_sync(mut self) -> Self {
        self.sync_on_write = false;
        self
    }

    /// Directory holding the blob files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::BackendError(format!(
                "invalid blob name for file backend: '{name}'"
            )));
        }
        Ok(self.root.join(format!("{name}.{BLOB_EXTENSION}")))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, name: &str) -> Result<Option<String>, StorageError> {
        let path = self.blob_path(name)?;
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let payload = codec::decode(&mut BufReader::new(file)).map_err(|e| match e.kind() {
            ErrorKind::InvalidData | ErrorKind::UnexpectedEof => StorageError::BlobCorrupted {
                blob: name.to_string(),
                reason: e.to_string(),
            },
            _ => StorageError::Io(e),
        })?;

        String::from_utf8(payload)
            .map(Some)
            .map_err(|e| StorageError::BlobCorrupted {
                blob: name.to_string(),
                reason: format!("payload is not UTF-8: {e}"),
            })
    }

    fn set(&self, name: &str, data: &str) -> Result<(), StorageError> {
        let path = self.blob_path(name)?;
        let tmp = path.with_extension(format!("{BLOB_EXTENSION}.tmp"));

        {
            let file = File::create(&tmp)?;
            let mut writer = BufWriter::new(file);
            codec::encode(&mut writer, data.as_bytes())?;
            writer.flush()?;
            if self.sync_on_write {
                writer.get_ref().sync_all()?;
            }
        }

        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), StorageError> {
        let path = self.blob_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_blob_roundtrip_and_remove() {
        let dir = tempdir().unwrap();
        let store = FileBlobStore::open(dir.path()).unwrap().without_sync();

        assert!(store.get("persons").unwrap().is_none());
        store.set("persons", r#"{"jane doe":{}}"#).unwrap();
        assert_eq!(
            store.get("persons").unwrap().as_deref(),
            Some(r#"{"jane doe":{}}"#)
        );
        assert!(dir.path().join("persons.blob").exists());
        assert!(!dir.path().join("persons.blob.tmp").exists());

        store.remove("persons").unwrap();
        assert!(store.get("persons").unwrap().is_none());
        store.remove("persons").unwrap();
    }

    #[test]
    fn rejects_path_like_names() {
        let dir = tempdir().unwrap();
        let store = FileBlobStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.set("../escape", "{}"),
            Err(StorageError::BackendError(_))
        ));
        assert!(matches!(store.get(""), Err(StorageError::BackendError(_))));
    }

    #[test]
    fn flipped_byte_is_reported_as_corruption() {
        let dir = tempdir().unwrap();
        let store = FileBlobStore::open(dir.path()).unwrap().without_sync();
        store.set("companies", r#"{"acme":{"name":"Acme"}}"#).unwrap();

        let path = dir.path().join("companies.blob");
        let mut bytes = fs::read(&path).unwrap();
        bytes[12] ^= 0xFF;
        fs::write(&path, bytes).unwrap();

        let err = store.get("companies").unwrap_err();
        assert!(err.is_corruption(), "unexpected error: {err}");
    }
}
