//! Issue data model consumed by the board

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow status of an issue
///
/// Unknown values deserialize into [`Status::Other`] so a newer tracker
/// schema never breaks loading.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Blocked,
    Deferred,
    Pinned,
    Hooked,
    Closed,
    Tombstone,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Deferred => "deferred",
            Self::Pinned => "pinned",
            Self::Hooked => "hooked",
            Self::Closed => "closed",
            Self::Tombstone => "tombstone",
            Self::Other(s) => s,
        }
    }

    /// Closed and tombstoned issues count as done
    pub fn is_closed_like(&self) -> bool {
        matches!(self, Self::Closed | Self::Tombstone)
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Self {
        match s {
            "open" => Self::Open,
            "in_progress" => Self::InProgress,
            "blocked" => Self::Blocked,
            "deferred" => Self::Deferred,
            "pinned" => Self::Pinned,
            "hooked" => Self::Hooked,
            "closed" => Self::Closed,
            "tombstone" => Self::Tombstone,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of work an issue represents
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueType {
    Bug,
    Feature,
    #[default]
    Task,
    Epic,
    Chore,
    Other(String),
}

impl IssueType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Task => "task",
            Self::Epic => "epic",
            Self::Chore => "chore",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for IssueType {
    fn from(s: &str) -> Self {
        match s {
            "bug" => Self::Bug,
            "feature" => Self::Feature,
            "task" => Self::Task,
            "epic" => Self::Epic,
            "chore" => Self::Chore,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for IssueType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<IssueType> for String {
    fn from(t: IssueType) -> Self {
        t.as_str().to_string()
    }
}

/// Relationship carried by a dependency edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DependencyKind {
    #[default]
    Blocks,
    ParentChild,
    Related,
    DiscoveredFrom,
    Other(String),
}

impl DependencyKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Blocks => "blocks",
            Self::ParentChild => "parent-child",
            Self::Related => "related",
            Self::DiscoveredFrom => "discovered-from",
            Self::Other(s) => s,
        }
    }

    /// Only blocking edges gate readiness
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Blocks)
    }
}

impl From<&str> for DependencyKind {
    fn from(s: &str) -> Self {
        match s {
            "blocks" => Self::Blocks,
            "parent-child" => Self::ParentChild,
            "related" => Self::Related,
            "discovered-from" => Self::DiscoveredFrom,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for DependencyKind {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<DependencyKind> for String {
    fn from(kind: DependencyKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A dependency declared by `issue_id` on `depends_on_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(default)]
    pub issue_id: String,
    pub depends_on_id: String,
    #[serde(default, rename = "type")]
    pub kind: DependencyKind,
}

/// Issue information
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub issue_type: IssueType,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Issue {
    /// Blocking dependencies in declaration order
    pub fn blocking_deps(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|d| d.kind.is_blocking())
    }

    pub fn has_blocking_deps(&self) -> bool {
        self.blocking_deps().next().is_some()
    }

    /// Priority label, clamped to P0..P4
    pub fn priority_label(&self) -> String {
        format!("P{}", self.priority.clamp(0, 4))
    }
}
