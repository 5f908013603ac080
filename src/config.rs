//! Store configuration.

use serde::Deserialize;

use crate::error::{StoreError, StoreResult};

/// Names of the three blobs the store keeps in the persistence port.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BlobNames {
    /// Person map.
    pub persons: String,
    /// Company map.
    pub companies: String,
    /// Settings record.
    pub settings: String,
}

impl Default for BlobNames {
    fn default() -> Self {
        Self {
            persons: "persons".to_string(),
            companies: "companies".to_string(),
            settings: "settings".to_string(),
        }
    }
}

/// What to do when a persisted blob cannot be parsed on open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptBlobPolicy {
    /// Start from an empty map and record a [`crate::store::BlobRecovery`].
    #[default]
    Reset,
    /// Refuse to open the store.
    Fail,
}

/// Configuration for [`crate::EntityStore`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Blob names in the persistence port.
    pub blobs: BlobNames,
    /// Handling of unparseable blobs on open.
    pub corrupt_blob_policy: CorruptBlobPolicy,
    /// Provider reported when no settings have been saved.
    pub default_provider: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            blobs: BlobNames::default(),
            corrupt_blob_policy: CorruptBlobPolicy::Reset,
            default_provider: "anthropic".to_string(),
        }
    }
}

impl StoreConfig {
    /// Parses a JSON configuration document; missing fields take defaults.
    ///
    /// # Errors
    /// `InvalidConfig` if the document is malformed or fails validation.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| StoreError::invalid_config(format!("malformed config: {e}")))?;
        cfg.validate()
    }

    /// Checks blob names and the default provider.
    ///
    /// # Errors
    /// `InvalidConfig` if a blob name is empty, two blob names collide, or the
    /// default provider is empty.
    pub fn validate(self) -> StoreResult<Self> {
        let names = [
            ("persons", &self.blobs.persons),
            ("companies", &self.blobs.companies),
            ("settings", &self.blobs.settings),
        ];

        for (role, name) in names {
            if name.trim().is_empty() {
                return Err(StoreError::invalid_config(format!(
                    "blob name for {role} must not be empty"
                )));
            }
        }

        for (i, (role_a, a)) in names.iter().enumerate() {
            for (role_b, b) in &names[i + 1..] {
                if a == b {
                    return Err(StoreError::invalid_config(format!(
                        "blob names for {role_a} and {role_b} collide ('{a}')"
                    )));
                }
            }
        }

        if self.default_provider.trim().is_empty() {
            return Err(StoreError::invalid_config("default_provider must not be empty"));
        }

        Ok(self)
    }
}
