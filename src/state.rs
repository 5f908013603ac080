//! The two entity maps and the upsert-merge operations over them.
//!
//! `GraphState` is plain data: it does no I/O and has no notion of
//! persistence. [`crate::EntityStore`] wraps it in a unit of work so both
//! maps are committed together.
//!
//! Write-time edge dedup is by partner key only. A second lookup that
//! reports the same company under a different position does not add a
//! second edge on the person. The graph builder dedups by
//! (person, company, position), so the two layers deliberately disagree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::lookup::{CompanyLookup, CompanyRole, PersonLookup, PersonRole};
use crate::model::{prefer_ref, prefer_text, Company, CompanyEdge, Person, PersonEdge};
use crate::normalize::{normalize_company, normalize_person};
use crate::resolve::{resolve_key, resolve_or_new};

/// What an upsert changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertSummary {
    /// Key the subject was stored under.
    pub key: String,
    /// True if the subject record did not exist before.
    pub created: bool,
    /// Edges appended to the subject.
    pub edges_added: usize,
    /// Stub records created on the opposite side.
    pub stubs_created: usize,
    /// Entries skipped because their partner name normalized to empty.
    pub skipped: usize,
}

/// Persons and companies keyed by canonical key.
///
/// Maps are ordered so every derived view (resolution, graph build, export)
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphState {
    /// Persons by canonical key.
    pub persons: BTreeMap<String, Person>,
    /// Companies by canonical key.
    pub companies: BTreeMap<String, Company>,
}

impl GraphState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if neither map holds a record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.persons.is_empty() && self.companies.is_empty()
    }

    /// Resolves a person key against the stored person keys.
    #[must_use]
    pub fn resolve_person(&self, key: &str) -> Option<&str> {
        resolve_key(self.persons.keys().map(String::as_str), key).key()
    }

    /// Resolves a company key against the stored company keys.
    #[must_use]
    pub fn resolve_company(&self, key: &str) -> Option<&str> {
        resolve_key(self.companies.keys().map(String::as_str), key).key()
    }

    /// Folds a person lookup into the maps.
    ///
    /// # Errors
    /// `EmptyName` if the person's name normalizes to an empty key; the state
    /// is left untouched.
    pub fn upsert_person(&mut self, lookup: &PersonLookup) -> StoreResult<UpsertSummary> {
        let fresh = normalize_person(&lookup.name);
        if fresh.is_empty() {
            return Err(StoreError::EmptyName {
                name: lookup.name.clone(),
            });
        }

        let key = resolve_or_new(self.persons.keys().map(String::as_str), &fresh);
        let (mut person, created) = match self.persons.remove(&key) {
            Some(existing) => (existing, false),
            None => (Person::stub(lookup.name.clone(), key.clone(), None), true),
        };

        person.name.clone_from(&lookup.name);
        person.summary = prefer_text(&lookup.summary, &person.summary);
        person.photo_ref = prefer_ref(lookup.photo_ref.as_ref(), person.photo_ref.as_ref());
        person.expanded = true;

        let mut summary = UpsertSummary {
            key: key.clone(),
            created,
            edges_added: 0,
            stubs_created: 0,
            skipped: 0,
        };

        for role in &lookup.companies {
            let fresh_company = normalize_company(&role.company_name);
            if fresh_company.is_empty() {
                tracing::warn!(person = %key, company = %role.company_name, "skipping company with empty key");
                summary.skipped += 1;
                continue;
            }

            let company_key = resolve_or_new(self.companies.keys().map(String::as_str), &fresh_company);
            if !person.has_company(&company_key) {
                person.companies.push(company_edge(role, &company_key));
                summary.edges_added += 1;
            }
            // Create the stub now so later entries in this payload resolve to it.
            if self.ensure_company(&company_key, &role.company_name, role.logo_ref.as_ref()) {
                summary.stubs_created += 1;
            }
        }

        // Heal edges from earlier writes whose company record is missing.
        for edge in &person.companies {
            if self.ensure_company(&edge.company_key, &edge.company_name, edge.logo_ref.as_ref()) {
                summary.stubs_created += 1;
            }
        }

        self.persons.insert(key, person);
        tracing::debug!(
            key = %summary.key,
            created = summary.created,
            edges_added = summary.edges_added,
            stubs_created = summary.stubs_created,
            "upserted person"
        );
        Ok(summary)
    }

    /// Folds a company lookup into the maps.
    ///
    /// # Errors
    /// `EmptyName` if the company's name normalizes to an empty key; the
    /// state is left untouched.
    pub fn upsert_company(&mut self, lookup: &CompanyLookup) -> StoreResult<UpsertSummary> {
        let fresh = normalize_company(&lookup.name);
        if fresh.is_empty() {
            return Err(StoreError::EmptyName {
                name: lookup.name.clone(),
            });
        }

        let key = resolve_or_new(self.companies.keys().map(String::as_str), &fresh);
        let (mut company, created) = match self.companies.remove(&key) {
            Some(existing) => (existing, false),
            None => (Company::stub(lookup.name.clone(), key.clone(), None), true),
        };

        company.name.clone_from(&lookup.name);
        company.description = prefer_text(&lookup.description, &company.description);
        company.products = prefer_text(&lookup.products, &company.products);
        company.history = prefer_text(&lookup.history, &company.history);
        company.logo_ref = prefer_ref(lookup.logo_ref.as_ref(), company.logo_ref.as_ref());
        company.expanded = true;

        let mut summary = UpsertSummary {
            key: key.clone(),
            created,
            edges_added: 0,
            stubs_created: 0,
            skipped: 0,
        };

        for role in &lookup.notable_people {
            let fresh_person = normalize_person(&role.person_name);
            if fresh_person.is_empty() {
                tracing::warn!(company = %key, person = %role.person_name, "skipping person with empty key");
                summary.skipped += 1;
                continue;
            }

            let person_key = resolve_or_new(self.persons.keys().map(String::as_str), &fresh_person);
            if !company.has_person(&person_key) {
                company.notable_people.push(person_edge(role, &person_key));
                summary.edges_added += 1;
            }
            if self.ensure_person(&person_key, &role.person_name, role.photo_ref.as_ref()) {
                summary.stubs_created += 1;
            }
        }

        for edge in &company.notable_people {
            if self.ensure_person(&edge.person_key, &edge.person_name, edge.photo_ref.as_ref()) {
                summary.stubs_created += 1;
            }
        }

        self.companies.insert(key, company);
        tracing::debug!(
            key = %summary.key,
            created = summary.created,
            edges_added = summary.edges_added,
            stubs_created = summary.stubs_created,
            "upserted company"
        );
        Ok(summary)
    }

    /// Creates a company stub if `key` is missing, else backfills its logo.
    /// Returns true if a stub was created.
    fn ensure_company(&mut self, key: &str, name: &str, logo_ref: Option<&String>) -> bool {
        match self.companies.get_mut(key) {
            Some(existing) => {
                if existing.logo_ref.as_deref().map_or(true, str::is_empty) {
                    existing.logo_ref = prefer_ref(logo_ref, existing.logo_ref.as_ref());
                }
                false
            }
            None => {
                let logo = logo_ref.filter(|s| !s.is_empty()).cloned();
                self.companies
                    .insert(key.to_string(), Company::stub(name, key, logo));
                true
            }
        }
    }

    /// Creates a person stub if `key` is missing, else backfills the photo.
    /// Returns true if a stub was created.
    fn ensure_person(&mut self, key: &str, name: &str, photo_ref: Option<&String>) -> bool {
        match self.persons.get_mut(key) {
            Some(existing) => {
                if existing.photo_ref.as_deref().map_or(true, str::is_empty) {
                    existing.photo_ref = prefer_ref(photo_ref, existing.photo_ref.as_ref());
                }
                false
            }
            None => {
                let photo = photo_ref.filter(|s| !s.is_empty()).cloned();
                self.persons
                    .insert(key.to_string(), Person::stub(name, key, photo));
                true
            }
        }
    }
}

fn company_edge(role: &CompanyRole, company_key: &str) -> CompanyEdge {
    CompanyEdge {
        company_name: role.company_name.clone(),
        company_key: company_key.to_string(),
        logo_ref: role.logo_ref.clone(),
        position: role.position.clone(),
        start_year: role.start_year,
        end_year: role.end_year,
        projects: role.projects.clone(),
        coworkers: role.coworkers.clone(),
        manager_name: role.manager_name.clone(),
        notes: role.notes.clone(),
    }
}

fn person_edge(role: &PersonRole, person_key: &str) -> PersonEdge {
    PersonEdge {
        person_name: role.person_name.clone(),
        person_key: person_key.to_string(),
        photo_ref: role.photo_ref.clone(),
        position: role.position.clone(),
        start_year: role.start_year,
        end_year: role.end_year,
        projects: role.projects.clone(),
        coworkers: role.coworkers.clone(),
        manager_name: role.manager_name.clone(),
    }
}
