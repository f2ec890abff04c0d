//! Immutable issue set shared between the loader and the board

use std::collections::HashMap;
use std::sync::Arc;

use super::issue::Issue;
use super::swimlane::BoardState;

/// A replace-wholesale view of the issue set
///
/// Columns elsewhere refer to issues by their position in this list, so the
/// list is never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct IssueSnapshot {
    issues: Arc<[Issue]>,
    lookup: HashMap<String, usize>,
    board_state: Option<BoardState>,
}

impl IssueSnapshot {
    /// Build the ID lookup; grouping happens on demand
    pub fn new(issues: Vec<Issue>) -> Self {
        let mut lookup = HashMap::with_capacity(issues.len());
        for (idx, issue) in issues.iter().enumerate() {
            // First occurrence wins on duplicate IDs
            lookup.entry(issue.id.clone()).or_insert(idx);
        }
        Self {
            issues: issues.into(),
            lookup,
            board_state: None,
        }
    }

    /// Build the lookup and precompute the grouping for every mode
    pub fn with_board_state(issues: Vec<Issue>) -> Self {
        let mut snapshot = Self::new(issues);
        snapshot.board_state = Some(BoardState::build(&snapshot.issues));
        snapshot
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn get(&self, idx: usize) -> Option<&Issue> {
        self.issues.get(idx)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.lookup.get(id).copied()
    }

    pub fn find(&self, id: &str) -> Option<&Issue> {
        self.index_of(id).and_then(|idx| self.issues.get(idx))
    }

    pub fn board_state(&self) -> Option<&BoardState> {
        self.board_state.as_ref()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}
