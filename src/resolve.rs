//! Fuzzy canonical-key resolution.
//!
//! Decides whether a freshly normalized key refers to an entity that is
//! already stored under a different (truncated or extended) key, e.g.
//! `"websense"` vs `"websense security labs"`.
//!
//! Matching is substring containment in either direction. When several
//! stored keys qualify, the one closest in length wins (for a containment
//! pair that is exactly the edit distance), then the lexicographically
//! smallest. The result never depends on map iteration order.

use std::cmp::Ordering;

/// Outcome of resolving a candidate key against the stored keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The candidate is itself a stored key.
    Exact(&'a str),
    /// A stored key contains, or is contained in, the candidate.
    Fuzzy {
        /// The chosen stored key.
        key: &'a str,
        /// Edit distance between candidate and `key`.
        distance: usize,
        /// Number of stored keys tied at `distance` (1 when unambiguous).
        contenders: usize,
    },
    /// Nothing matched; the caller creates a new entity.
    Unresolved,
}

impl<'a> Resolution<'a> {
    /// The matched stored key, if any.
    #[must_use]
    pub const fn key(&self) -> Option<&'a str> {
        match self {
            Self::Exact(key) | Self::Fuzzy { key, .. } => Some(*key),
            Self::Unresolved => None,
        }
    }

    /// Returns true when more than one stored key tied for the best match.
    #[must_use]
    pub const fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Fuzzy { contenders, .. } if *contenders > 1)
    }
}

/// Resolve `candidate` against `existing` stored keys.
///
/// Empty strings never match anything: an empty candidate is always
/// [`Resolution::Unresolved`], and an empty stored key is ignored.
///
/// ```
/// use careergraph::resolve::{resolve_key, Resolution};
///
/// let keys = ["websense", "acme"];
/// assert_eq!(resolve_key(keys, "acme"), Resolution::Exact("acme"));
/// assert_eq!(resolve_key(keys, "websense security labs").key(), Some("websense"));
/// assert_eq!(resolve_key(keys, "initech"), Resolution::Unresolved);
/// ```
pub fn resolve_key<'a, I>(existing: I, candidate: &str) -> Resolution<'a>
where
    I: IntoIterator<Item = &'a str>,
{
    if candidate.is_empty() {
        return Resolution::Unresolved;
    }

    let candidate_len = candidate.chars().count();
    let mut best: Option<(usize, &'a str)> = None;
    let mut contenders = 0usize;

    for key in existing {
        if key == candidate {
            return Resolution::Exact(key);
        }
        if key.is_empty() || !(key.contains(candidate) || candidate.contains(key)) {
            continue;
        }

        let distance = key.chars().count().abs_diff(candidate_len);
        match best {
            None => {
                best = Some((distance, key));
                contenders = 1;
            }
            Some((best_distance, best_key)) => match distance.cmp(&best_distance) {
                Ordering::Less => {
                    best = Some((distance, key));
                    contenders = 1;
                }
                Ordering::Equal => {
                    contenders += 1;
                    if key < best_key {
                        best = Some((distance, key));
                    }
                }
                Ordering::Greater => {}
            },
        }
    }

    match best {
        Some((distance, key)) => {
            if contenders > 1 {
                tracing::debug!(
                    candidate,
                    chosen = key,
                    contenders,
                    "ambiguous fuzzy key resolution"
                );
            }
            Resolution::Fuzzy {
                key,
                distance,
                contenders,
            }
        }
        None => Resolution::Unresolved,
    }
}

/// Convenience wrapper returning the resolved key or the candidate itself.
pub fn resolve_or_new<'a, I>(existing: I, candidate: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    resolve_key(existing, candidate)
        .key()
        .map_or_else(|| candidate.to_string(), str::to_string)
}
