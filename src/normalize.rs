//! Name normalization.
//!
//! Maps a raw display name to the canonical string used as a dedup key.
//! Persons and companies use different policies; both must be applied
//! identically at write time (upsert) and read time (graph build).
//!
//! Neither function is strictly idempotent. Stripping a middle initial can
//! expose another single-letter token, and a company name may carry two
//! stacked legal suffixes of which only one is removed per pass. For
//! ordinary ASCII person and business names a second pass is a no-op.

use std::sync::OnceLock;

use regex::Regex;

/// Trailing generational or professional suffixes stripped from person names.
pub const PERSON_SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv", "phd", "md", "esq"];

/// Trailing legal-entity suffixes stripped from company names (at most one).
pub const LEGAL_SUFFIXES: &[&str] = &[
    "inc",
    "llc",
    "ltd",
    "corp",
    "co",
    "corporation",
    "incorporated",
    "limited",
    "company",
    "group",
    "holdings",
];

/// Trailing generic descriptor words stripped from company names (at most one).
pub const DESCRIPTOR_WORDS: &[&str] = &[
    "technologies",
    "technology",
    "security",
    "networks",
    "systems",
    "solutions",
    "software",
    "labs",
    "digital",
    "media",
    "studios",
    "services",
    "consulting",
    "partners",
    "ventures",
    "international",
    "global",
    "usa",
    "us",
];

struct Patterns {
    whitespace: Regex,
    person_suffix: Regex,
    initial: Regex,
    legal_suffix: Regex,
    descriptor: Regex,
}

fn trailing_word(prefix: &str, words: &[&str]) -> Regex {
    // Word lists are fixed ASCII literals, so the pattern always compiles.
    Regex::new(&format!("{prefix}(?:{})$", words.join("|"))).expect("static word-list pattern")
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let fixed = |p: &str| Regex::new(p).expect("static pattern");
        Patterns {
            whitespace: fixed(r"\s+"),
            person_suffix: trailing_word(r",?\s+", PERSON_SUFFIXES),
            initial: fixed(r"\b[a-z]\b"),
            legal_suffix: trailing_word(r"(?:,\s*|\s+)", LEGAL_SUFFIXES),
            descriptor: trailing_word(r"\s+", DESCRIPTOR_WORDS),
        }
    })
}

/// Lowercase, drop periods, collapse whitespace runs to one space.
fn base_form(name: &str) -> String {
    let lowered = name.trim().to_lowercase().replace('.', "");
    patterns().whitespace.replace_all(&lowered, " ").into_owned()
}

fn collapse(s: &str) -> String {
    patterns().whitespace.replace_all(s, " ").trim().to_string()
}

/// Canonical dedup key for a person's display name.
///
/// ```
/// use careergraph::normalize::normalize_person;
///
/// assert_eq!(normalize_person("John H. Dimm"), "john dimm");
/// assert_eq!(normalize_person("John Dimm"), "john dimm");
/// assert_eq!(normalize_person("Martin Luther King, Jr."), "martin luther king");
/// ```
#[must_use]
pub fn normalize_person(name: &str) -> String {
    let p = patterns();
    let base = base_form(name);
    let without_suffix = p.person_suffix.replace(&base, "");
    let without_initials = p.initial.replace_all(&without_suffix, "");
    collapse(&without_initials)
}

/// Canonical dedup key for a company's display name.
///
/// ```
/// use careergraph::normalize::normalize_company;
///
/// assert_eq!(normalize_company("Websense, Inc."), "websense");
/// assert_eq!(normalize_company("Websense Inc"), "websense");
/// assert_eq!(normalize_company("Blue Titan Software"), "blue titan");
/// ```
#[must_use]
pub fn normalize_company(name: &str) -> String {
    let p = patterns();
    let base = base_form(name);
    let without_legal = p.legal_suffix.replace(&base, "");
    let without_descriptor = p.descriptor.replace(&without_legal, "");
    collapse(&without_descriptor)
}
