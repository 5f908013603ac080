//! Share/restore document.
//!
//! A [`GraphExport`] is a self-contained JSON snapshot of both entity maps,
//! handed to an external durable store for sharing. Restoring it goes
//! through [`crate::EntityStore::import_export`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::model::{Company, Person};
use crate::state::GraphState;

/// A snapshot of the person and company maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphExport {
    /// Person map, keyed as stored.
    pub persons: BTreeMap<String, Person>,
    /// Company map, keyed as stored.
    pub companies: BTreeMap<String, Company>,
    /// When the snapshot was taken.
    pub exported_at: DateTime<Utc>,
}

impl GraphExport {
    /// Snapshots `state` now.
    #[must_use]
    pub fn from_state(state: &GraphState) -> Self {
        Self {
            persons: state.persons.clone(),
            companies: state.companies.clone(),
            exported_at: Utc::now(),
        }
    }

    /// Converts back into entity maps.
    #[must_use]
    pub fn into_state(self) -> GraphState {
        GraphState {
            persons: self.persons,
            companies: self.companies,
        }
    }

    /// Serializes the document.
    ///
    /// # Errors
    /// `Serialization` if a record cannot be encoded.
    pub fn to_json(&self) -> StoreResult<String> {
        serde_json::to_string(self).map_err(|e| StoreError::Serialization {
            blob: "export".to_string(),
            message: e.to_string(),
        })
    }

    /// Parses a document produced by [`GraphExport::to_json`].
    ///
    /// # Errors
    /// `InvalidImport` if the document is malformed.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        serde_json::from_str(json).map_err(|e| StoreError::InvalidImport {
            reason: e.to_string(),
        })
    }

    /// Hex blake3 digest over both maps. `exported_at` does not contribute,
    /// so two snapshots of unchanged data share a fingerprint.
    ///
    /// # Errors
    /// `Serialization` if a record cannot be encoded.
    pub fn fingerprint(&self) -> StoreResult<String> {
        let mut hasher = blake3::Hasher::new();
        hash_map(&mut hasher, "persons", &self.persons)?;
        hash_map(&mut hasher, "companies", &self.companies)?;
        Ok(hasher.finalize().to_hex().to_string())
    }
}

fn hash_map<T: Serialize>(
    hasher: &mut blake3::Hasher,
    tag: &str,
    map: &BTreeMap<String, T>,
) -> StoreResult<()> {
    hasher.update(tag.as_bytes());
    hasher.update(&(map.len() as u64).to_le_bytes());
    for (key, record) in map {
        hasher.update(&(key.len() as u64).to_le_bytes());
        hasher.update(key.as_bytes());
        let bytes = serde_json::to_vec(record).map_err(|e| StoreError::Serialization {
            blob: tag.to_string(),
            message: e.to_string(),
        })?;
        hasher.update(&(bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    Ok(())
}
