//! Incremental substring search over the board

use super::issue::Issue;
use super::swimlane::Columns;

/// Location of a hit, by raw column and row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    pub col: usize,
    pub row: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    active: bool,
    query: String,
    matches: Vec<SearchMatch>,
    cursor: usize,
}

impl SearchState {
    /// Enter input mode with an empty query
    pub fn start(&mut self) {
        self.active = true;
        self.query.clear();
        self.matches.clear();
        self.cursor = 0;
    }

    /// Leave input mode, keeping matches for n/N
    pub fn finish(&mut self) {
        self.active = false;
    }

    pub fn cancel(&mut self) {
        self.active = false;
        self.query.clear();
        self.matches.clear();
        self.cursor = 0;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// 1-based cursor for display, 0 when nothing matched
    pub fn cursor_pos(&self) -> usize {
        if self.matches.is_empty() {
            0
        } else {
            self.cursor + 1
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
    }

    /// Returns false when the query was already empty
    pub fn pop_char(&mut self) -> bool {
        self.query.pop().is_some()
    }

    /// Recompute matches; returns the first hit to jump to
    pub fn rescan(&mut self, columns: &Columns, issues: &[Issue]) -> Option<SearchMatch> {
        self.matches.clear();
        self.cursor = 0;
        if self.query.is_empty() {
            return None;
        }
        let needle = self.query.to_lowercase();
        for (col, column) in columns.iter().enumerate() {
            for (row, &idx) in column.iter().enumerate() {
                let Some(issue) = issues.get(idx) else {
                    continue;
                };
                if issue.id.to_lowercase().contains(&needle)
                    || issue.title.to_lowercase().contains(&needle)
                {
                    self.matches.push(SearchMatch { col, row });
                }
            }
        }
        self.current()
    }

    pub fn current(&self) -> Option<SearchMatch> {
        self.matches.get(self.cursor).copied()
    }

    pub fn next_match(&mut self) -> Option<SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1) % self.matches.len();
        self.current()
    }

    pub fn prev_match(&mut self) -> Option<SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + self.matches.len() - 1) % self.matches.len();
        self.current()
    }

    /// Current hit, only while typing
    pub fn is_current_match(&self, col: usize, row: usize) -> bool {
        self.active && self.current() == Some(SearchMatch { col, row })
    }

    /// Any hit, only while typing
    pub fn is_match(&self, col: usize, row: usize) -> bool {
        self.active && self.matches.contains(&SearchMatch { col, row })
    }
}
