//! Swimlane grouping: four fixed columns under one of three modes

use std::cmp::Ordering;
use std::sync::Arc;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

use super::issue::{Issue, IssueType, Status};

/// Number of columns on the board, in every mode
pub const COLUMN_COUNT: usize = 4;

/// Column contents as indices into the snapshot's issue list
pub type Columns = [Vec<usize>; COLUMN_COUNT];

/// Dimension used to assign issues to columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SwimLaneMode {
    #[default]
    #[serde(rename = "status")]
    ByStatus,
    #[serde(rename = "priority")]
    ByPriority,
    #[serde(rename = "type")]
    ByType,
}

/// Everything that varies by mode, kept in one row
pub struct LaneSet {
    pub name: &'static str,
    pub titles: [&'static str; COLUMN_COUNT],
    pub icons: [&'static str; COLUMN_COUNT],
    pub colors: [Color; COLUMN_COUNT],
    assign: fn(&Issue) -> usize,
}

impl LaneSet {
    pub fn column_for(&self, issue: &Issue) -> usize {
        (self.assign)(issue)
    }
}

fn status_column(issue: &Issue) -> usize {
    if issue.status.is_closed_like() {
        return 3;
    }
    match issue.status {
        Status::InProgress => 1,
        Status::Blocked => 2,
        _ => 0,
    }
}

fn priority_column(issue: &Issue) -> usize {
    match issue.priority {
        0 => 0,
        1 => 1,
        2 => 2,
        _ => 3,
    }
}

fn type_column(issue: &Issue) -> usize {
    match issue.issue_type {
        IssueType::Bug => 0,
        IssueType::Feature => 1,
        IssueType::Epic => 3,
        _ => 2,
    }
}

static STATUS_LANES: LaneSet = LaneSet {
    name: "Status",
    titles: ["OPEN", "IN PROGRESS", "BLOCKED", "CLOSED"],
    icons: ["📋", "🔄", "🚫", "✅"],
    colors: [
        Color::Rgb(80, 250, 123),
        Color::Rgb(139, 233, 253),
        Color::Rgb(255, 85, 85),
        Color::Rgb(98, 114, 164),
    ],
    assign: status_column,
};

static PRIORITY_LANES: LaneSet = LaneSet {
    name: "Priority",
    titles: ["P0 CRITICAL", "P1 HIGH", "P2 MEDIUM", "P3+ OTHER"],
    icons: ["🔴", "🟠", "🟡", "🔵"],
    colors: [
        Color::Rgb(255, 85, 85),
        Color::Rgb(255, 184, 108),
        Color::Rgb(241, 250, 140),
        Color::Rgb(98, 114, 164),
    ],
    assign: priority_column,
};

static TYPE_LANES: LaneSet = LaneSet {
    name: "Type",
    titles: ["BUG", "FEATURE", "TASK", "EPIC"],
    icons: ["🐛", "✨", "📝", "🏔"],
    colors: [
        Color::Rgb(255, 85, 85),
        Color::Rgb(189, 147, 249),
        Color::Rgb(241, 250, 140),
        Color::Rgb(255, 121, 198),
    ],
    assign: type_column,
};

impl SwimLaneMode {
    pub const ALL: [SwimLaneMode; 3] = [Self::ByStatus, Self::ByPriority, Self::ByType];

    pub fn lanes(self) -> &'static LaneSet {
        match self {
            Self::ByStatus => &STATUS_LANES,
            Self::ByPriority => &PRIORITY_LANES,
            Self::ByType => &TYPE_LANES,
        }
    }

    /// Status -> Priority -> Type -> Status
    pub fn next(self) -> Self {
        match self {
            Self::ByStatus => Self::ByPriority,
            Self::ByPriority => Self::ByType,
            Self::ByType => Self::ByStatus,
        }
    }

    pub fn name(self) -> &'static str {
        self.lanes().name
    }

    pub fn column_for(self, issue: &Issue) -> usize {
        self.lanes().column_for(issue)
    }
}

/// Priority ascending, then newest first; undated issues go last
fn compare_issues(a: &Issue, b: &Issue) -> Ordering {
    a.priority.cmp(&b.priority).then_with(|| {
        match (a.created_at, b.created_at) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    })
}

/// Partition `issues` into the four columns of `mode`, each sorted
pub fn group_issues(issues: &[Issue], mode: SwimLaneMode) -> Columns {
    let lanes = mode.lanes();
    let mut columns: Columns = Default::default();
    for (idx, issue) in issues.iter().enumerate() {
        columns[lanes.column_for(issue)].push(idx);
    }
    for column in &mut columns {
        column.sort_by(|&a, &b| compare_issues(&issues[a], &issues[b]));
    }
    columns
}

/// Precomputed grouping for every mode
#[derive(Debug, Clone, Default)]
pub struct BoardState {
    by_status: Arc<Columns>,
    by_priority: Arc<Columns>,
    by_type: Arc<Columns>,
}

impl BoardState {
    pub fn build(issues: &[Issue]) -> Self {
        Self {
            by_status: Arc::new(group_issues(issues, SwimLaneMode::ByStatus)),
            by_priority: Arc::new(group_issues(issues, SwimLaneMode::ByPriority)),
            by_type: Arc::new(group_issues(issues, SwimLaneMode::ByType)),
        }
    }

    pub fn columns_for_mode(&self, mode: SwimLaneMode) -> Arc<Columns> {
        match mode {
            SwimLaneMode::ByStatus => Arc::clone(&self.by_status),
            SwimLaneMode::ByPriority => Arc::clone(&self.by_priority),
            SwimLaneMode::ByType => Arc::clone(&self.by_type),
        }
    }
}
