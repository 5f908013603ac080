//! Stored person and company records.
//!
//! Relationships are not entities of their own. A person carries an ordered
//! list of [`CompanyEdge`]s and a company an ordered list of [`PersonEdge`]s;
//! the same real-world relationship is usually written on both sides and is
//! reconciled when the graph is built.
//!
//! The serialized shape of these types is the persisted blob format.

use serde::{Deserialize, Serialize};

/// A person's role at a company, stored on the person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyEdge {
    pub company_name: String,
    /// Canonical key of the company this edge points at.
    pub company_key: String,
    #[serde(default)]
    pub logo_ref: Option<String>,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub coworkers: Vec<String>,
    #[serde(default)]
    pub manager_name: Option<String>,
    /// Free-text performance notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A notable person's role, stored on the company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonEdge {
    pub person_name: String,
    /// Canonical key of the person this edge points at.
    pub person_key: String,
    #[serde(default)]
    pub photo_ref: Option<String>,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub coworkers: Vec<String>,
    #[serde(default)]
    pub manager_name: Option<String>,
}

/// A person record.
///
/// `expanded` is true once the person has been the direct subject of a
/// lookup; a record created only because a company mentioned the person is a
/// stub with `expanded == false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub photo_ref: Option<String>,
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub companies: Vec<CompanyEdge>,
}

impl Person {
    /// Creates a stub for a person referenced from a company.
    #[must_use]
    pub fn stub(name: impl Into<String>, key: impl Into<String>, photo_ref: Option<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            summary: String::new(),
            photo_ref,
            expanded: false,
            companies: Vec::new(),
        }
    }

    /// Returns true if an edge already points at `company_key`.
    #[must_use]
    pub fn has_company(&self, company_key: &str) -> bool {
        self.companies.iter().any(|c| c.company_key == company_key)
    }
}

/// A company record.
///
/// `aliases` keeps display names the record has carried before a manual
/// merge relabelled it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub products: String,
    #[serde(default)]
    pub history: String,
    #[serde(default)]
    pub logo_ref: Option<String>,
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub notable_people: Vec<PersonEdge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl Company {
    /// Creates a stub for a company referenced from a person.
    #[must_use]
    pub fn stub(name: impl Into<String>, key: impl Into<String>, logo_ref: Option<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            description: String::new(),
            products: String::new(),
            history: String::new(),
            logo_ref,
            expanded: false,
            notable_people: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// Returns true if an edge already points at `person_key`.
    #[must_use]
    pub fn has_person(&self, person_key: &str) -> bool {
        self.notable_people.iter().any(|p| p.person_key == person_key)
    }

    /// Records a former display name, ignoring blanks and case-insensitive repeats.
    pub fn add_alias(&mut self, alias: impl Into<String>) {
        let alias = alias.into();
        let trimmed = alias.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case(&self.name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(trimmed))
        {
            return;
        }
        self.aliases.push(trimmed.to_string());
    }
}

/// Returns `incoming` when it carries text, else `current`.
pub(crate) fn prefer_text(incoming: &str, current: &str) -> String {
    if incoming.is_empty() {
        current.to_string()
    } else {
        incoming.to_string()
    }
}

/// Returns `incoming` when it is a non-empty reference, else `current`.
pub(crate) fn prefer_ref(incoming: Option<&String>, current: Option<&String>) -> Option<String> {
    incoming
        .filter(|s| !s.is_empty())
        .or_else(|| current.filter(|s| !s.is_empty()))
        .cloned()
}
