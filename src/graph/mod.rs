//! Render graph.
//!
//! This module groups the builder and the node/edge types it emits.

mod builder;
mod types;

pub use builder::GraphBuilder;
pub use types::{GraphData, GraphEdge, GraphNode, NodeId, NodeKind};
