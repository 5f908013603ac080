use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use careergraph::{CompanyLookup, CompanyRole, EntityStore, GraphBuilder, GraphState, PersonLookup, PersonRole};

const COMPANY_STEMS: &[&str] = &[
    "Acme", "Globex", "Initech", "Umbrella", "Hooli", "Vandelay", "Stark", "Wayne", "Tyrell", "Cyberdyne",
];
const SUFFIXES: &[&str] = &["", " Inc", ", Inc.", " Software", " Corp", " Labs"];

fn company_name(i: usize) -> String {
    let stem = COMPANY_STEMS[i % COMPANY_STEMS.len()];
    let suffix = SUFFIXES[(i / COMPANY_STEMS.len()) % SUFFIXES.len()];
    format!("{stem} {}{suffix}", i / 7)
}

fn person_lookup(i: usize) -> PersonLookup {
    let mut lookup = PersonLookup::named(format!("Person {i} Q. Sample"));
    for j in 0..4 {
        lookup = lookup.with_company(
            CompanyRole::new(company_name(i + j * 13), format!("Role {j}")).years(Some(2000 + j as i32), None),
        );
    }
    lookup
}

fn company_lookup(i: usize) -> CompanyLookup {
    let mut lookup = CompanyLookup::named(company_name(i));
    for j in 0..3 {
        lookup = lookup.with_person(PersonRole::new(format!("Person {} Sample", i + j), "Advisor"));
    }
    lookup
}

/// Seeds a state with `n` person lookups and `n / 2` company lookups.
fn seeded_state(n: usize) -> GraphState {
    let mut state = GraphState::new();
    for i in 0..n {
        state.upsert_person(&person_lookup(i)).unwrap();
    }
    for i in 0..n / 2 {
        state.upsert_company(&company_lookup(i)).unwrap();
    }
    state
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build/build");
    for n in [100usize, 1_000] {
        let state = seeded_state(n);
        group.throughput(Throughput::Elements((state.persons.len() + state.companies.len()) as u64));
        group.bench_function(format!("{n}_lookups"), |b| {
            b.iter(|| black_box(GraphBuilder::new(&state).build()));
        });
    }
    group.finish();
}

fn bench_upsert(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build/upsert");
    group.throughput(Throughput::Elements(1));

    group.bench_function("state_person_into_500", |b| {
        let base = seeded_state(500);
        let lookup = person_lookup(10_000);
        b.iter_batched(
            || base.clone(),
            |mut state| black_box(state.upsert_person(&lookup).unwrap()),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("store_person_committed", |b| {
        let lookup = person_lookup(10_000);
        b.iter_batched(
            || {
                let mut store = EntityStore::in_memory();
                for i in 0..100 {
                    store.upsert_person(&person_lookup(i)).unwrap();
                }
                store
            },
            |mut store| black_box(store.upsert_person(&lookup).unwrap()),
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(graph_build, bench_build, bench_upsert);
criterion_main!(graph_build);
