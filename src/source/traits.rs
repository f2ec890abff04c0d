//! Trait abstraction for issue loading to enable mocking in tests

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::state::Issue;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no issues found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid issue data at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Supplier of the issue working set
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssueSource: Send + Sync {
    /// Load the full issue set
    async fn load_issues(&self) -> Result<Vec<Issue>, SourceError>;

    /// Short human-readable origin, shown in the status bar
    fn describe(&self) -> String;
}
