//! Node/edge types handed to the rendering layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A person.
    Person,
    /// A company.
    Company,
}

impl NodeKind {
    /// Prefix used in node ids.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Company => "company",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical node id of the form `person:<key>` or `company:<key>`.
///
/// The key part is the *fresh* normalization of the record's display name at
/// build time, which may differ from the key the record is stored under.
///
/// # Examples
///
/// ```
/// use careergraph::{NodeId, NodeKind};
///
/// let id = NodeId::company("blue titan");
/// assert_eq!(id.as_str(), "company:blue titan");
/// assert_eq!(id.kind(), Some(NodeKind::Company));
/// assert_eq!(id.key(), "blue titan");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Builds the id for a node of `kind` with canonical `key`.
    #[must_use]
    pub fn new(kind: NodeKind, key: &str) -> Self {
        Self(format!("{kind}:{key}"))
    }

    /// Person node id.
    #[must_use]
    pub fn person(key: &str) -> Self {
        Self::new(NodeKind::Person, key)
    }

    /// Company node id.
    #[must_use]
    pub fn company(key: &str) -> Self {
        Self::new(NodeKind::Company, key)
    }

    /// Wraps an id string received from the rendering layer.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The full id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The canonical key after the first `:`; the whole id when there is none.
    #[must_use]
    pub fn key(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(_, key)| key)
    }

    /// The node kind encoded in the prefix, if recognized.
    #[must_use]
    pub fn kind(&self) -> Option<NodeKind> {
        match self.0.split_once(':')?.0 {
            "person" => Some(NodeKind::Person),
            "company" => Some(NodeKind::Company),
            _ => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A deduplicated person or company node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    pub expanded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    /// Photo for persons, logo for companies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

/// A person-to-company relationship.
///
/// `source_id` is always the person node and `target_id` the company node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub source_id: NodeId,
    pub target_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coworkers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Full render payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphData {
    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Nodes of one kind, in output order.
    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    /// Edges between a person node and a company node.
    pub fn edges_between<'a>(
        &'a self,
        person: &'a NodeId,
        company: &'a NodeId,
    ) -> impl Iterator<Item = &'a GraphEdge> {
        self.edges
            .iter()
            .filter(move |e| &e.source_id == person && &e.target_id == company)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_parts() {
        let id = NodeId::person("john dimm");
        assert_eq!(id.to_string(), "person:john dimm");
        assert_eq!(id.kind(), Some(NodeKind::Person));
        assert_eq!(id.key(), "john dimm");
    }

    #[test]
    fn node_id_key_keeps_later_colons() {
        let id = NodeId::company("acme: the sequel");
        assert_eq!(id.key(), "acme: the sequel");
    }

    #[test]
    fn raw_id_without_prefix() {
        let id = NodeId::from_raw("acme");
        assert_eq!(id.key(), "acme");
        assert_eq!(id.kind(), None);
        assert_eq!(NodeId::from_raw("team:acme").kind(), None);
    }

    #[test]
    fn render_payload_omits_absent_fields() {
        let node = GraphNode {
            id: NodeId::company("acme"),
            kind: NodeKind::Company,
            name: "Acme".to_string(),
            expanded: false,
            summary: None,
            description: Some("Makes everything".to_string()),
            products: None,
            history: None,
            image_ref: None,
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["id"], "company:acme");
        assert_eq!(json["kind"], "company");
        assert!(json.get("summary").is_none());
        assert!(json.get("imageRef").is_none());
        assert_eq!(json["description"], "Makes everything");
    }
}
