//! Manual company merge.
//!
//! Collapses two company records that automatic resolution failed to unify.
//! The source record is deleted; every person edge pointing at it is
//! repointed to the target. This is the only path that destroys a record.

use crate::model::Company;
use crate::state::GraphState;

/// Why a merge request changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The source key matched no company.
    SourceUnresolved,
    /// The target key matched no company.
    TargetUnresolved,
    /// Both keys resolved to the same company.
    SameRecord,
}

/// What a completed merge did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// Resolved key of the deleted company.
    pub source_key: String,
    /// Resolved key of the surviving company.
    pub target_key: String,
    /// Display name of the surviving company after relabelling.
    pub target_name: String,
    /// Notable-people entries moved from source to target.
    pub people_moved: usize,
    /// Person-side edges repointed from source to target.
    pub edges_repointed: usize,
}

/// Result of [`GraphState::merge_companies`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The source was folded into the target.
    Merged(MergeReport),
    /// Nothing changed.
    Skipped(SkipReason),
}

impl MergeOutcome {
    /// Returns true if the maps were modified.
    #[must_use]
    pub const fn is_merged(&self) -> bool {
        matches!(self, Self::Merged(_))
    }
}

impl GraphState {
    /// Folds company `source_key` into company `target_key`.
    ///
    /// Both keys go through fuzzy resolution first. The target keeps its
    /// non-empty scalar fields and takes the source's where its own are
    /// empty. Its display name becomes `"{target} ({source})"`, and the
    /// pre-merge names are kept in `aliases`.
    pub fn merge_companies(&mut self, source_key: &str, target_key: &str) -> MergeOutcome {
        let Some(source_key) = self.resolve_company(source_key).map(str::to_string) else {
            return MergeOutcome::Skipped(SkipReason::SourceUnresolved);
        };
        let Some(target_key) = self.resolve_company(target_key).map(str::to_string) else {
            return MergeOutcome::Skipped(SkipReason::TargetUnresolved);
        };
        if source_key == target_key {
            return MergeOutcome::Skipped(SkipReason::SameRecord);
        }

        let Some(source) = self.companies.remove(&source_key) else {
            return MergeOutcome::Skipped(SkipReason::SourceUnresolved);
        };
        let Some(target) = self.companies.get_mut(&target_key) else {
            self.companies.insert(source_key, source);
            return MergeOutcome::Skipped(SkipReason::TargetUnresolved);
        };

        let people_moved = absorb(target, &source);
        let target_name = target.name.clone();

        let mut edges_repointed = 0usize;
        for person in self.persons.values_mut() {
            for edge in &mut person.companies {
                if edge.company_key == source_key {
                    edge.company_key.clone_from(&target_key);
                    edge.company_name.clone_from(&target_name);
                    edges_repointed += 1;
                }
            }
        }

        tracing::info!(
            source = %source_key,
            target = %target_key,
            people_moved,
            edges_repointed,
            "merged companies"
        );

        MergeOutcome::Merged(MergeReport {
            source_key,
            target_key,
            target_name,
            people_moved,
            edges_repointed,
        })
    }
}

/// Moves `source`'s data into `target`. Returns the number of people moved.
fn absorb(target: &mut Company, source: &Company) -> usize {
    if target.description.is_empty() {
        target.description.clone_from(&source.description);
    }
    if target.products.is_empty() {
        target.products.clone_from(&source.products);
    }
    if target.history.is_empty() {
        target.history.clone_from(&source.history);
    }
    if target.logo_ref.as_deref().map_or(true, str::is_empty) {
        target.logo_ref.clone_from(&source.logo_ref);
    }

    let relabelled = format!("{} ({})", target.name, source.name);
    let previous_name = std::mem::replace(&mut target.name, relabelled);
    target.add_alias(previous_name);
    target.add_alias(source.name.clone());
    for alias in &source.aliases {
        target.add_alias(alias.clone());
    }

    let mut moved = 0usize;
    for person in &source.notable_people {
        if !target.has_person(&person.person_key) {
            target.notable_people.push(person.clone());
            moved += 1;
        }
    }
    moved
}
