//! Read-time graph construction.
//!
//! Every record is re-normalized from its display name, whatever key it is
//! stored under. Records whose fresh keys agree collapse into one node, which
//! heals stale keys from older normalization rules and near-duplicates the
//! write-time resolver missed. Nothing in the store is modified.

use std::collections::{HashMap, HashSet};

use crate::graph::types::{GraphData, GraphEdge, GraphNode, NodeId, NodeKind};
use crate::model::{CompanyEdge, PersonEdge};
use crate::normalize::{normalize_company, normalize_person};
use crate::state::GraphState;

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn non_empty_ref(s: Option<&String>) -> Option<String> {
    s.filter(|s| !s.is_empty()).cloned()
}

fn non_empty_list(v: &[String]) -> Option<Vec<String>> {
    if v.is_empty() {
        None
    } else {
        Some(v.to_vec())
    }
}

/// Folds `incoming` into `slot`.
///
/// A promoting record (the first expanded one) wins wherever it has a value;
/// otherwise values only fill gaps, so the first non-empty one sticks.
fn fold_field(slot: &mut Option<String>, incoming: Option<String>, promote: bool) {
    if incoming.is_some() && (promote || slot.is_none()) {
        *slot = incoming;
    }
}

fn fold_node(nodes: &mut Vec<GraphNode>, index: &mut HashMap<NodeId, usize>, draft: GraphNode) {
    let Some(&i) = index.get(&draft.id) else {
        index.insert(draft.id.clone(), nodes.len());
        nodes.push(draft);
        return;
    };

    let node = &mut nodes[i];
    let promote = !node.expanded && draft.expanded;
    if promote {
        node.name = draft.name;
        node.expanded = true;
    }
    fold_field(&mut node.summary, draft.summary, promote);
    fold_field(&mut node.description, draft.description, promote);
    fold_field(&mut node.products, draft.products, promote);
    fold_field(&mut node.history, draft.history, promote);
    fold_field(&mut node.image_ref, draft.image_ref, promote);
}

/// Builds the deduplicated render graph from a [`GraphState`].
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder<'a> {
    state: &'a GraphState,
}

/// Canonical node id for every stored key of one entity kind.
struct Canonical<'a> {
    kind: NodeKind,
    by_stored_key: HashMap<&'a str, NodeId>,
}

impl Canonical<'_> {
    fn resolve(&self, stored_key: &str) -> NodeId {
        if let Some(id) = self.by_stored_key.get(stored_key) {
            return id.clone();
        }
        let fresh = match self.kind {
            NodeKind::Person => normalize_person(stored_key),
            NodeKind::Company => normalize_company(stored_key),
        };
        NodeId::new(self.kind, if fresh.is_empty() { stored_key } else { fresh.as_str() })
    }
}

impl<'a> GraphBuilder<'a> {
    /// Creates a builder over `state`.
    #[must_use]
    pub const fn new(state: &'a GraphState) -> Self {
        Self { state }
    }

    /// Produces nodes (persons first, then companies) and deduplicated edges.
    #[must_use]
    pub fn build(&self) -> GraphData {
        let mut nodes = Vec::with_capacity(self.state.persons.len() + self.state.companies.len());
        let mut index: HashMap<NodeId, usize> = HashMap::new();

        let persons = self.canonical_persons(&mut nodes, &mut index);
        let companies = self.canonical_companies(&mut nodes, &mut index);

        let mut edges = Vec::new();
        let mut seen: HashSet<(NodeId, NodeId, String)> = HashSet::new();
        let mut dangling = 0usize;

        for (stored_key, person) in &self.state.persons {
            let person_id = persons.resolve(stored_key);
            for edge in &person.companies {
                let company_id = companies.resolve(&edge.company_key);
                if !index.contains_key(&company_id) {
                    dangling += 1;
                    continue;
                }
                if seen.insert((person_id.clone(), company_id.clone(), edge.position.clone())) {
                    edges.push(edge_from_person_side(person_id.clone(), company_id, edge));
                }
            }
        }

        for (stored_key, company) in &self.state.companies {
            let company_id = companies.resolve(stored_key);
            for edge in &company.notable_people {
                let person_id = persons.resolve(&edge.person_key);
                if !index.contains_key(&person_id) {
                    dangling += 1;
                    continue;
                }
                if seen.insert((person_id.clone(), company_id.clone(), edge.position.clone())) {
                    edges.push(edge_from_company_side(person_id, company_id.clone(), edge));
                }
            }
        }

        if dangling > 0 {
            tracing::debug!(dangling, "skipped edges pointing at missing records");
        }

        GraphData { nodes, edges }
    }

    fn canonical_persons(
        &self,
        nodes: &mut Vec<GraphNode>,
        index: &mut HashMap<NodeId, usize>,
    ) -> Canonical<'a> {
        let state = self.state;
        let mut by_stored_key = HashMap::new();
        for (stored_key, person) in &state.persons {
            let fresh = normalize_person(&person.name);
            let id = NodeId::person(if fresh.is_empty() { stored_key } else { &fresh });
            by_stored_key.insert(stored_key.as_str(), id.clone());
            by_stored_key.entry(person.key.as_str()).or_insert_with(|| id.clone());

            fold_node(
                nodes,
                index,
                GraphNode {
                    id,
                    kind: NodeKind::Person,
                    name: person.name.clone(),
                    expanded: person.expanded,
                    summary: non_empty(&person.summary),
                    description: None,
                    products: None,
                    history: None,
                    image_ref: non_empty_ref(person.photo_ref.as_ref()),
                },
            );
        }
        Canonical {
            kind: NodeKind::Person,
            by_stored_key,
        }
    }

    fn canonical_companies(
        &self,
        nodes: &mut Vec<GraphNode>,
        index: &mut HashMap<NodeId, usize>,
    ) -> Canonical<'a> {
        let state = self.state;
        let mut by_stored_key = HashMap::new();
        for (stored_key, company) in &state.companies {
            let fresh = normalize_company(&company.name);
            let id = NodeId::company(if fresh.is_empty() { stored_key } else { &fresh });
            by_stored_key.insert(stored_key.as_str(), id.clone());
            by_stored_key.entry(company.key.as_str()).or_insert_with(|| id.clone());

            fold_node(
                nodes,
                index,
                GraphNode {
                    id,
                    kind: NodeKind::Company,
                    name: company.name.clone(),
                    expanded: company.expanded,
                    summary: None,
                    description: non_empty(&company.description),
                    products: non_empty(&company.products),
                    history: non_empty(&company.history),
                    image_ref: non_empty_ref(company.logo_ref.as_ref()),
                },
            );
        }
        Canonical {
            kind: NodeKind::Company,
            by_stored_key,
        }
    }
}

fn edge_from_person_side(source_id: NodeId, target_id: NodeId, edge: &CompanyEdge) -> GraphEdge {
    GraphEdge {
        source_id,
        target_id,
        position: non_empty(&edge.position),
        start_year: edge.start_year,
        end_year: edge.end_year,
        projects: non_empty_list(&edge.projects),
        coworkers: non_empty_list(&edge.coworkers),
        manager_name: non_empty_ref(edge.manager_name.as_ref()),
        notes: non_empty_ref(edge.notes.as_ref()),
    }
}

fn edge_from_company_side(source_id: NodeId, target_id: NodeId, edge: &PersonEdge) -> GraphEdge {
    GraphEdge {
        source_id,
        target_id,
        position: non_empty(&edge.position),
        start_year: edge.start_year,
        end_year: edge.end_year,
        projects: non_empty_list(&edge.projects),
        coworkers: non_empty_list(&edge.coworkers),
        manager_name: non_empty_ref(edge.manager_name.as_ref()),
        notes: None,
    }
}
