//! Lookup results handed to the store by the search/extraction collaborator.
//!
//! These are partial, independently sourced snapshots. Names arrive raw; the
//! store normalizes and resolves them. Field shapes mirror the collaborator's
//! JSON so payloads can be deserialized directly.

use serde::{Deserialize, Serialize};

/// One company in a person's career, as reported by a person lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyRole {
    pub company_name: String,
    pub position: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub projects: Vec<String>,
    pub coworkers: Vec<String>,
    pub manager_name: Option<String>,
    pub notes: Option<String>,
    pub logo_ref: Option<String>,
}

/// Result of looking up a person.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonLookup {
    pub name: String,
    pub summary: String,
    pub photo_ref: Option<String>,
    pub companies: Vec<CompanyRole>,
}

/// One notable person at a company, as reported by a company lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonRole {
    pub person_name: String,
    pub position: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub projects: Vec<String>,
    pub coworkers: Vec<String>,
    pub manager_name: Option<String>,
    pub photo_ref: Option<String>,
}

/// Result of looking up a company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyLookup {
    pub name: String,
    pub description: String,
    pub products: String,
    pub history: String,
    pub logo_ref: Option<String>,
    pub notable_people: Vec<PersonRole>,
}

impl PersonLookup {
    /// Starts a person lookup with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a company role.
    #[must_use]
    pub fn with_company(mut self, role: CompanyRole) -> Self {
        self.companies.push(role);
        self
    }
}

impl CompanyLookup {
    /// Starts a company lookup with only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a notable person.
    #[must_use]
    pub fn with_person(mut self, role: PersonRole) -> Self {
        self.notable_people.push(role);
        self
    }
}

impl CompanyRole {
    /// A role with a company name and position.
    #[must_use]
    pub fn new(company_name: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            position: position.into(),
            ..Self::default()
        }
    }

    /// Sets the start and end year.
    #[must_use]
    pub fn years(mut self, start: Option<i32>, end: Option<i32>) -> Self {
        self.start_year = start;
        self.end_year = end;
        self
    }
}

impl PersonRole {
    /// A role with a person name and position.
    #[must_use]
    pub fn new(person_name: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            person_name: person_name.into(),
            position: position.into(),
            ..Self::default()
        }
    }

    /// Sets the start and end year.
    #[must_use]
    pub fn years(mut self, start: Option<i32>, end: Option<i32>) -> Self {
        self.start_year = start;
        self.end_year = end;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_lookup_from_collaborator_json() {
        let json = r#"{
            "name": "Jane Doe",
            "summary": "Engineer",
            "photoRef": null,
            "companies": [
                {"companyName": "Acme Corp", "position": "Engineer", "startYear": 2015, "endYear": 2018,
                 "projects": ["Rocket"], "coworkers": [], "managerName": "Wile E", "notes": null, "logoRef": "acme.png"}
            ]
        }"#;
        let lookup: PersonLookup = serde_json::from_str(json).unwrap();
        assert_eq!(lookup.companies.len(), 1);
        assert_eq!(lookup.companies[0].end_year, Some(2018));
        assert_eq!(lookup.companies[0].logo_ref.as_deref(), Some("acme.png"));
    }

    #[test]
    fn missing_fields_default() {
        let lookup: CompanyLookup =
            serde_json::from_str(r#"{"name":"Acme","notablePeople":[{"personName":"Jane Doe"}]}"#).unwrap();
        assert!(lookup.description.is_empty());
        assert!(lookup.notable_people[0].position.is_empty());
        assert_eq!(lookup.notable_people[0].start_year, None);
    }

    #[test]
    fn builders() {
        let lookup = PersonLookup::named("Jane Doe")
            .with_company(CompanyRole::new("Acme", "Engineer").years(Some(2015), Some(2018)));
        assert_eq!(lookup.companies[0].start_year, Some(2015));

        let lookup = CompanyLookup::named("Acme").with_person(PersonRole::new("Jane Doe", "CTO"));
        assert_eq!(lookup.notable_people[0].position, "CTO");
    }
}
