//! Blocking-dependency bookkeeping
//!
//! The forward direction (what an issue waits on) lives on the issue itself.
//! This module adds the reverse direction: for each issue, which others it
//! blocks.

use std::collections::HashMap;

use super::issue::Issue;
use super::snapshot::IssueSnapshot;

/// Reverse index from a blocking target to the issues that depend on it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyIndex {
    blocks: HashMap<String, Vec<String>>,
}

impl DependencyIndex {
    /// Scan every issue's dependency list once
    pub fn build(issues: &[Issue]) -> Self {
        let mut blocks: HashMap<String, Vec<String>> = HashMap::new();
        for issue in issues {
            for dep in issue.blocking_deps() {
                blocks
                    .entry(dep.depends_on_id.clone())
                    .or_default()
                    .push(issue.id.clone());
            }
        }
        Self { blocks }
    }

    /// IDs of the issues waiting on `id`, in scan order
    pub fn blocks(&self, id: &str) -> &[String] {
        self.blocks.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn blocks_others(&self, id: &str) -> bool {
        !self.blocks(id).is_empty()
    }

    /// Number of distinct targets that block at least one issue
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Whether any blocking dependency of `issue` is still unresolved
///
/// Targets missing from the lookup never count as blockers. Without a lookup
/// any blocking dependency counts.
pub fn has_open_blocker(issue: &Issue, lookup: Option<&IssueSnapshot>) -> bool {
    match lookup {
        Some(snapshot) => issue.blocking_deps().any(|dep| {
            snapshot
                .find(&dep.depends_on_id)
                .is_some_and(|target| !target.status.is_closed_like())
        }),
        None => issue.has_blocking_deps(),
    }
}

/// Open work with nothing left blocking it
pub fn is_ready(issue: &Issue, lookup: Option<&IssueSnapshot>) -> bool {
    !issue.status.is_closed_like() && !has_open_blocker(issue, lookup)
}
