//! # careergraph - Reconciliation for an incrementally explored people/company graph
//!
//! Each lookup of a person or company returns a partial snapshot (names,
//! roles, dates) from an independent source. careergraph folds those
//! snapshots into one running graph without producing duplicate nodes, even
//! when the same entity arrives spelled differently ("Websense" vs
//! "Websense, Inc.", "John Dimm" vs "John H. Dimm").
//!
//! ## Core Concepts
//!
//! - **Canonical key**: normalized form of a display name, used to look up records
//! - **Stub**: a record created only because the other side referenced it
//! - **Expanded**: a record that has been the direct subject of a lookup
//! - **Self-healing build**: read-time re-normalization that collapses near-duplicates
//!
//! ## Usage
//!
//! ```rust
//! use careergraph::{CompanyLookup, CompanyRole, EntityStore, NodeKind, PersonLookup, PersonRole};
//!
//! let mut store = EntityStore::in_memory();
//! store.upsert_person(
//!     &PersonLookup::named("Jane Doe").with_company(CompanyRole::new("Acme Corp", "Engineer")),
//! )?;
//! store.upsert_company(&CompanyLookup::named("Acme").with_person(PersonRole::new("Jane Doe", "Engineer")))?;
//!
//! let graph = store.build();
//! assert_eq!(graph.nodes_of(NodeKind::Person).count(), 1);
//! assert_eq!(graph.nodes_of(NodeKind::Company).count(), 1);
//! assert_eq!(graph.edges.len(), 1);
//! # Ok::<(), careergraph::StoreError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Pure reconciliation
pub mod lookup;
pub mod model;
pub mod normalize;
pub mod resolve;

// State, graph, merge
pub mod graph;
pub mod merge;
pub mod state;

// Persistence
pub mod config;
pub mod error;
pub mod export;
pub mod settings;
pub mod storage;
pub mod store;

pub use config::{BlobNames, CorruptBlobPolicy, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use export::GraphExport;
pub use graph::{GraphBuilder, GraphData, GraphEdge, GraphNode, NodeId, NodeKind};
pub use lookup::{CompanyLookup, CompanyRole, PersonLookup, PersonRole};
pub use merge::{MergeOutcome, MergeReport, SkipReason};
pub use model::{Company, CompanyEdge, Person, PersonEdge};
pub use normalize::{normalize_company, normalize_person};
pub use resolve::{resolve_key, Resolution};
pub use settings::Settings;
pub use state::{GraphState, UpsertSummary};
pub use storage::{BlobStore, InMemoryBlobStore, StorageError};
pub use store::{BlobRecovery, CompanyName, EntityStore, RawBlobs};

#[cfg(feature = "persistent")]
pub use storage::FileBlobStore;
