//! Port-backed entity store.
//!
//! [`EntityStore`] owns the in-memory [`GraphState`] and keeps it in step
//! with the persistence port. Every mutation runs against a copy of the
//! state and is committed as a two-blob unit of work; the in-memory
//! state is replaced only once both blobs are written.
//!
//! The store assumes a single logical writer. Callers that fetch lookups
//! concurrently must serialize their upserts.

mod unit_of_work;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::{CorruptBlobPolicy, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::export::GraphExport;
use crate::graph::{GraphBuilder, GraphData};
use crate::lookup::{CompanyLookup, PersonLookup};
use crate::merge::MergeOutcome;
use crate::model::{Company, Person};
use crate::normalize::{normalize_company, normalize_person};
use crate::settings::Settings;
use crate::state::{GraphState, UpsertSummary};
use crate::storage::BlobStore;

use unit_of_work::{commit, EncodedMaps};

/// A blob that could not be parsed on open and was replaced by an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobRecovery {
    /// Blob name in the port.
    pub blob: String,
    /// Parser or backend message.
    pub reason: String,
}

/// Display name and key of a stored company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyName {
    /// Display name.
    pub name: String,
    /// Canonical key the record is stored under.
    pub key: String,
}

/// Raw entity blobs, exactly as held by the port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlobs {
    /// Serialized person map.
    pub persons: String,
    /// Serialized company map.
    pub companies: String,
}

/// The reconciliation store.
pub struct EntityStore {
    port: Arc<dyn BlobStore>,
    config: StoreConfig,
    state: GraphState,
    settings: Option<Settings>,
    recoveries: Vec<BlobRecovery>,
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("config", &self.config)
            .field("persons", &self.state.persons.len())
            .field("companies", &self.state.companies.len())
            .field("recoveries", &self.recoveries)
            .finish_non_exhaustive()
    }
}

impl EntityStore {
    /// Opens a store over `port`, loading all three blobs.
    ///
    /// # Errors
    /// `InvalidConfig` if `config` fails validation, `Storage` if the port
    /// cannot be read, and `CorruptBlob` if an entity blob is unreadable
    /// under [`CorruptBlobPolicy::Fail`].
    pub fn open(port: Arc<dyn BlobStore>, config: StoreConfig) -> StoreResult<Self> {
        let config = config.validate()?;
        let policy = config.corrupt_blob_policy;
        let mut recoveries = Vec::new();

        let persons = load_map(port.as_ref(), &config.blobs.persons, policy, &mut recoveries)?;
        let companies = load_map(port.as_ref(), &config.blobs.companies, policy, &mut recoveries)?;
        let settings = load_settings(port.as_ref(), &config.blobs.settings, &mut recoveries)?;

        tracing::info!(
            persons = persons.len(),
            companies = companies.len(),
            recovered = recoveries.len(),
            "entity store opened"
        );

        Ok(Self {
            port,
            config,
            state: GraphState { persons, companies },
            settings,
            recoveries,
        })
    }

    /// Opens a store over an empty in-memory port with default configuration.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            port: Arc::new(crate::storage::InMemoryBlobStore::new()),
            config: StoreConfig::default(),
            state: GraphState::new(),
            settings: None,
            recoveries: Vec::new(),
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Current committed state.
    #[must_use]
    pub fn state(&self) -> &GraphState {
        &self.state
    }

    /// Blobs that were reset on open.
    #[must_use]
    pub fn recoveries(&self) -> &[BlobRecovery] {
        &self.recoveries
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Folds a person lookup into the store and commits it.
    ///
    /// # Errors
    /// `EmptyName` for a blank subject, or any commit error. Nothing is
    /// changed on error.
    pub fn upsert_person(&mut self, lookup: &PersonLookup) -> StoreResult<UpsertSummary> {
        self.transact(|state| state.upsert_person(lookup))
    }

    /// Folds a company lookup into the store and commits it.
    ///
    /// # Errors
    /// `EmptyName` for a blank subject, or any commit error. Nothing is
    /// changed on error.
    pub fn upsert_company(&mut self, lookup: &CompanyLookup) -> StoreResult<UpsertSummary> {
        self.transact(|state| state.upsert_company(lookup))
    }

    /// Folds company `source_key` into `target_key`. See
    /// [`GraphState::merge_companies`].
    ///
    /// # Errors
    /// Commit errors only. A skipped merge writes nothing.
    pub fn merge_companies(&mut self, source_key: &str, target_key: &str) -> StoreResult<MergeOutcome> {
        self.transact(|state| Ok(state.merge_companies(source_key, target_key)))
    }

    /// Sets or clears a person's photo. Returns false if no person matches.
    ///
    /// # Errors
    /// Commit errors.
    pub fn update_person_photo(&mut self, name: &str, photo_ref: Option<String>) -> StoreResult<bool> {
        let key = normalize_person(name);
        self.transact(|state| {
            let Some(resolved) = state.resolve_person(&key).map(str::to_string) else {
                return Ok(false);
            };
            if let Some(person) = state.persons.get_mut(&resolved) {
                person.photo_ref = photo_ref.filter(|p| !p.is_empty());
            }
            Ok(true)
        })
    }

    /// Deletes both entity blobs and empties the maps. Settings are kept.
    ///
    /// # Errors
    /// `CommitFailed` if the port refuses a removal; both blobs and the
    /// in-memory state are kept.
    pub fn clear_graph(&mut self) -> StoreResult<()> {
        unit_of_work::clear(self.port.as_ref(), &self.config.blobs)?;
        let persons = self.state.persons.len();
        let companies = self.state.companies.len();
        self.state = GraphState::new();
        tracing::info!(persons, companies, "graph cleared");
        Ok(())
    }

    /// Runs `op` on a copy of the state and commits the copy if it changed.
    fn transact<T>(&mut self, op: impl FnOnce(&mut GraphState) -> StoreResult<T>) -> StoreResult<T> {
        let mut next = self.state.clone();
        let out = op(&mut next)?;
        if next != self.state {
            self.commit_state(next)?;
        }
        Ok(out)
    }

    fn commit_state(&mut self, next: GraphState) -> StoreResult<()> {
        let maps = EncodedMaps::encode(&next, &self.config.blobs)?;
        commit(self.port.as_ref(), &self.config.blobs, &maps)?;
        self.state = next;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Graph and queries
    // ------------------------------------------------------------------

    /// Builds the render graph from the committed state.
    #[must_use]
    pub fn build(&self) -> GraphData {
        GraphBuilder::new(&self.state).build()
    }

    /// Finds a person by display name or key.
    #[must_use]
    pub fn person(&self, name: &str) -> Option<&Person> {
        let key = normalize_person(name);
        let resolved = self.state.resolve_person(&key)?;
        self.state.persons.get(resolved)
    }

    /// Finds a company by display name or key.
    #[must_use]
    pub fn company(&self, name: &str) -> Option<&Company> {
        let key = normalize_company(name);
        let resolved = self.state.resolve_company(&key)?;
        self.state.companies.get(resolved)
    }

    /// All persons in key order.
    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.state.persons.values()
    }

    /// All companies in key order.
    pub fn companies(&self) -> impl Iterator<Item = &Company> {
        self.state.companies.values()
    }

    /// Whether the person has been the direct subject of a lookup.
    #[must_use]
    pub fn is_person_expanded(&self, name: &str) -> bool {
        self.person(name).is_some_and(|p| p.expanded)
    }

    /// Whether the company has been the direct subject of a lookup.
    #[must_use]
    pub fn is_company_expanded(&self, name: &str) -> bool {
        self.company(name).is_some_and(|c| c.expanded)
    }

    /// Display names of the companies recorded on a person.
    #[must_use]
    pub fn person_company_names(&self, name: &str) -> Vec<String> {
        self.person(name)
            .map(|p| p.companies.iter().map(|c| c.company_name.clone()).collect())
            .unwrap_or_default()
    }

    /// Display names of the notable people recorded on a company.
    #[must_use]
    pub fn company_people_names(&self, name: &str) -> Vec<String> {
        self.company(name)
            .map(|c| c.notable_people.iter().map(|p| p.person_name.clone()).collect())
            .unwrap_or_default()
    }

    /// Every stored company, for choosing merge candidates.
    #[must_use]
    pub fn company_names(&self) -> Vec<CompanyName> {
        self.state
            .companies
            .values()
            .map(|c| CompanyName {
                name: c.name.clone(),
                key: c.key.clone(),
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// The saved provider, or the configured default.
    #[must_use]
    pub fn active_provider(&self) -> &str {
        self.settings
            .as_ref()
            .map_or(self.config.default_provider.as_str(), |s| s.active_provider.as_str())
    }

    /// Saves the active provider.
    ///
    /// # Errors
    /// `InvalidConfig` for a blank provider, `Storage` if the write fails.
    pub fn set_active_provider(&mut self, provider: &str) -> StoreResult<()> {
        let provider = provider.trim();
        if provider.is_empty() {
            return Err(StoreError::invalid_config("active provider must not be empty"));
        }
        let settings = Settings::new(provider);
        let blob = serde_json::to_string(&settings).map_err(|e| StoreError::Serialization {
            blob: self.config.blobs.settings.clone(),
            message: e.to_string(),
        })?;
        self.port.set(&self.config.blobs.settings, &blob)?;
        self.settings = Some(settings);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Export / import
    // ------------------------------------------------------------------

    /// The entity blobs as stored, `{}` for a blob that was never written.
    ///
    /// # Errors
    /// `Storage` if the port cannot be read.
    pub fn export_blobs(&self) -> StoreResult<RawBlobs> {
        let read = |name: &str| -> StoreResult<String> {
            Ok(self.port.get(name)?.unwrap_or_else(|| "{}".to_string()))
        };
        Ok(RawBlobs {
            persons: read(&self.config.blobs.persons)?,
            companies: read(&self.config.blobs.companies)?,
        })
    }

    /// Replaces the entity blobs with `persons` and `companies` verbatim.
    ///
    /// Both documents are parsed before anything is written, so a malformed
    /// import leaves the store untouched.
    ///
    /// # Errors
    /// `InvalidImport` if either document does not parse, or commit errors.
    pub fn import_blobs(&mut self, persons: &str, companies: &str) -> StoreResult<()> {
        let next = GraphState {
            persons: parse_import(persons, &self.config.blobs.persons)?,
            companies: parse_import(companies, &self.config.blobs.companies)?,
        };
        let maps = EncodedMaps {
            persons: persons.to_string(),
            companies: companies.to_string(),
        };
        commit(self.port.as_ref(), &self.config.blobs, &maps)?;
        self.state = next;
        tracing::info!(
            persons = self.state.persons.len(),
            companies = self.state.companies.len(),
            "graph imported"
        );
        Ok(())
    }

    /// Snapshots the committed state as a share document.
    #[must_use]
    pub fn export(&self) -> GraphExport {
        GraphExport::from_state(&self.state)
    }

    /// Replaces the state with a share document.
    ///
    /// # Errors
    /// Commit errors.
    pub fn import_export(&mut self, export: GraphExport) -> StoreResult<()> {
        self.commit_state(export.into_state())?;
        tracing::info!(
            persons = self.state.persons.len(),
            companies = self.state.companies.len(),
            "graph imported"
        );
        Ok(())
    }
}

fn parse_import<T: DeserializeOwned>(raw: &str, blob: &str) -> StoreResult<BTreeMap<String, T>> {
    serde_json::from_str(raw).map_err(|e| StoreError::InvalidImport {
        reason: format!("{blob}: {e}"),
    })
}

fn load_map<T: DeserializeOwned>(
    port: &dyn BlobStore,
    blob: &str,
    policy: CorruptBlobPolicy,
    recoveries: &mut Vec<BlobRecovery>,
) -> StoreResult<BTreeMap<String, T>> {
    let parsed = match port.get(blob) {
        Ok(None) => return Ok(BTreeMap::new()),
        Ok(Some(raw)) if raw.trim().is_empty() => return Ok(BTreeMap::new()),
        Ok(Some(raw)) => serde_json::from_str(&raw).map_err(|e| e.to_string()),
        Err(e) if e.is_corruption() => Err(e.to_string()),
        Err(e) => return Err(e.into()),
    };

    match parsed {
        Ok(map) => Ok(map),
        Err(reason) => match policy {
            CorruptBlobPolicy::Fail => Err(StoreError::CorruptBlob {
                blob: blob.to_string(),
                reason,
            }),
            CorruptBlobPolicy::Reset => {
                tracing::warn!(blob, reason = %reason, "unreadable blob reset to empty");
                recoveries.push(BlobRecovery {
                    blob: blob.to_string(),
                    reason,
                });
                Ok(BTreeMap::new())
            }
        },
    }
}

/// Settings never block opening; an unreadable blob falls back to defaults.
fn load_settings(
    port: &dyn BlobStore,
    blob: &str,
    recoveries: &mut Vec<BlobRecovery>,
) -> StoreResult<Option<Settings>> {
    let raw = match port.get(blob) {
        Ok(raw) => raw,
        Err(e) if e.is_corruption() => {
            tracing::warn!(blob, error = %e, "unreadable settings ignored");
            recoveries.push(BlobRecovery {
                blob: blob.to_string(),
                reason: e.to_string(),
            });
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let Some(raw) = raw else {
        return Ok(None);
    };
    match Settings::parse(&raw) {
        Ok(settings) => Ok(settings),
        Err(e) => {
            tracing::warn!(blob, error = %e, "unreadable settings ignored");
            recoveries.push(BlobRecovery {
                blob: blob.to_string(),
                reason: e.to_string(),
            });
            Ok(None)
        }
    }
}
