//! End-to-end reconciliation tests.
//!
//! These drive lookups through the store the way the search collaborator
//! does and check the graph handed to the renderer.

use std::collections::HashSet;
use std::sync::Arc;

use careergraph::{
    normalize_company, normalize_person, CompanyLookup, CompanyRole, EntityStore, GraphData,
    InMemoryBlobStore, NodeId, NodeKind, PersonLookup, PersonRole, StoreConfig,
};

fn jane_at(company: &str, position: &str, start: i32, end: i32) -> PersonLookup {
    PersonLookup::named("Jane Doe")
        .with_company(CompanyRole::new(company, position).years(Some(start), Some(end)))
}

fn positions(graph: &GraphData, person: &NodeId, company: &NodeId) -> HashSet<String> {
    graph
        .edges_between(person, company)
        .filter_map(|e| e.position.clone())
        .collect()
}

#[test]
fn test_normalization_examples() {
    assert_eq!(normalize_person("John H. Dimm"), "john dimm");
    assert_eq!(normalize_person("John Dimm"), "john dimm");
    assert_eq!(normalize_company("Websense, Inc."), "websense");
    assert_eq!(normalize_company("Websense Inc"), "websense");
}

#[test]
fn test_normalization_is_idempotent_for_common_names() {
    for name in ["Grace B. Hopper", "Dr Alan Turing PhD", "Martin Luther King, Jr."] {
        let once = normalize_person(name);
        assert_eq!(normalize_person(&once), once, "person: {name}");
    }
    for name in ["Blue Titan Software", "Acme Holdings", "Palo Alto Networks, Inc."] {
        let once = normalize_company(name);
        assert_eq!(normalize_company(&once), once, "company: {name}");
    }
}

#[test]
fn test_person_and_company_lookups_meet_in_one_node_each() {
    let mut store = EntityStore::in_memory();
    store
        .upsert_person(&PersonLookup::named("Jane Doe").with_company(CompanyRole::new("Acme Corp", "CTO")))
        .unwrap();
    store
        .upsert_company(&CompanyLookup::named("Acme").with_person(PersonRole::new("Jane Doe", "CTO")))
        .unwrap();

    let graph = store.build();
    assert_eq!(graph.nodes_of(NodeKind::Person).count(), 1);
    assert_eq!(graph.nodes_of(NodeKind::Company).count(), 1);

    let jane = NodeId::person("jane doe");
    let acme = NodeId::company("acme");
    assert!(graph.node(&jane).unwrap().expanded);
    assert!(graph.node(&acme).unwrap().expanded);
    assert_eq!(graph.edges_between(&jane, &acme).count(), 1);
}

#[test]
fn test_write_time_dedup_suppresses_second_position() {
    let mut store = EntityStore::in_memory();
    store.upsert_person(&jane_at("Acme", "Engineer", 2015, 2018)).unwrap();
    store.upsert_person(&jane_at("Acme", "Senior Engineer", 2018, 2021)).unwrap();

    let jane = store.person("Jane Doe").unwrap();
    assert_eq!(jane.companies.len(), 1);
    assert_eq!(jane.companies[0].position, "Engineer");
    assert_eq!(jane.companies[0].start_year, Some(2015));

    let graph = store.build();
    let expected: HashSet<String> = ["Engineer".to_string()].into();
    assert_eq!(positions(&graph, &NodeId::person("jane doe"), &NodeId::company("acme")), expected);
}

#[test]
fn test_read_time_dedup_keeps_parallel_positions() {
    let mut store = EntityStore::in_memory();
    store.upsert_person(&jane_at("Acme", "Engineer", 2015, 2018)).unwrap();
    store
        .upsert_company(
            &CompanyLookup::named("Acme")
                .with_person(PersonRole::new("Jane Doe", "Senior Engineer").years(Some(2018), Some(2021))),
        )
        .unwrap();

    let graph = store.build();
    let jane = NodeId::person("jane doe");
    let acme = NodeId::company("acme");
    assert_eq!(graph.edges_between(&jane, &acme).count(), 2);
    let expected: HashSet<String> = ["Engineer".to_string(), "Senior Engineer".to_string()].into();
    assert_eq!(positions(&graph, &jane, &acme), expected);
}

#[test]
fn test_spelling_variants_resolve_to_existing_records() {
    let mut store = EntityStore::in_memory();
    store
        .upsert_person(&PersonLookup::named("John Dimm").with_company(CompanyRole::new("Websense", "Architect")))
        .unwrap();
    let summary = store
        .upsert_person(&PersonLookup::named("John H. Dimm").with_company(CompanyRole::new("Websense, Inc.", "Architect")))
        .unwrap();

    assert!(!summary.created);
    assert_eq!(summary.edges_added, 0);
    assert_eq!(store.persons().count(), 1);
    assert_eq!(store.companies().count(), 1);
}

#[test]
fn test_stub_then_expand_keeps_reference_data() {
    let mut store = EntityStore::in_memory();
    let mut role = CompanyRole::new("Initech", "Analyst");
    role.logo_ref = Some("initech.png".to_string());
    store.upsert_person(&PersonLookup::named("Peter Gibbons").with_company(role)).unwrap();

    assert!(!store.is_company_expanded("Initech"));
    assert_eq!(store.company("Initech").unwrap().logo_ref.as_deref(), Some("initech.png"));

    let mut lookup = CompanyLookup::named("Initech, LLC");
    lookup.description = "Software for banks".to_string();
    store.upsert_company(&lookup).unwrap();

    let initech = store.company("Initech").unwrap();
    assert!(initech.expanded);
    assert_eq!(initech.name, "Initech, LLC");
    assert_eq!(initech.logo_ref.as_deref(), Some("initech.png"));
    assert_eq!(store.person_company_names("Peter Gibbons"), vec!["Initech"]);
}

#[test]
fn test_build_heals_records_stored_under_stale_keys() {
    // Blobs written under an older normalization that kept legal suffixes.
    let persons = r#"{
        "jane doe": {"name":"Jane Doe","key":"jane doe","expanded":true,
            "companies":[{"companyName":"Acme Corp","companyKey":"acme corp","position":"CTO"}]}
    }"#;
    let companies = r#"{
        "acme corp": {"name":"Acme Corp","key":"acme corp","expanded":false},
        "acme": {"name":"Acme","key":"acme","expanded":true,"description":"Makes everything",
            "notablePeople":[{"personName":"Jane Doe","personKey":"jane doe","position":"CTO"}]}
    }"#;
    let port = Arc::new(InMemoryBlobStore::with_blobs([("persons", persons), ("companies", companies)]));
    let store = EntityStore::open(port, StoreConfig::default()).unwrap();
    assert_eq!(store.companies().count(), 2);

    let graph = store.build();
    let company_nodes: Vec<_> = graph.nodes_of(NodeKind::Company).collect();
    assert_eq!(company_nodes.len(), 1);
    assert_eq!(company_nodes[0].name, "Acme");
    assert_eq!(company_nodes[0].description.as_deref(), Some("Makes everything"));
    assert!(company_nodes[0].expanded);
    assert_eq!(graph.edges.len(), 1);

    // The stored maps are left as they were.
    assert_eq!(store.companies().count(), 2);
}

#[test]
fn test_build_output_serializes_for_renderer() {
    let mut store = EntityStore::in_memory();
    store
        .upsert_person(
            &PersonLookup::named("Jane Doe")
                .with_company(CompanyRole::new("Acme", "Engineer").years(Some(2015), None)),
        )
        .unwrap();

    let json = serde_json::to_value(store.build()).unwrap();
    let edge = &json["edges"][0];
    assert_eq!(edge["sourceId"], "person:jane doe");
    assert_eq!(edge["targetId"], "company:acme");
    assert_eq!(edge["startYear"], 2015);
    assert!(edge.get("endYear").is_none());
    assert!(edge.get("projects").is_none());
}

#[test]
fn test_fuzzy_resolution_is_stable_across_reopen() {
    let port = Arc::new(InMemoryBlobStore::new());
    {
        let mut store = EntityStore::open(port.clone(), StoreConfig::default()).unwrap();
        store.upsert_company(&CompanyLookup::named("Palo Alto Networks")).unwrap();
        store.upsert_company(&CompanyLookup::named("Alto")).unwrap();
    }
    let store = EntityStore::open(port, StoreConfig::default()).unwrap();
    assert_eq!(store.companies().count(), 1);
    assert_eq!(store.company("Palo Alto").unwrap().name, "Alto");
}
