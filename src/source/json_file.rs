//! Issues stored on disk as JSON lines or a single JSON array

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::traits::{IssueSource, SourceError};
use crate::state::Issue;

/// Where issues are looked up when nothing else is configured
pub const DEFAULT_ISSUES_PATH: &str = ".beads/issues.jsonl";

const BOM: char = '\u{feff}';

/// Reads the issue file on every load
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonFileSource {
    fn default() -> Self {
        Self::new(DEFAULT_ISSUES_PATH)
    }
}

#[async_trait]
impl IssueSource for JsonFileSource {
    async fn load_issues(&self) -> Result<Vec<Issue>, SourceError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(source) => {
                return Err(SourceError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let issues = parse_issues(&content)?;
        tracing::info!("Loaded {} issues from {}", issues.len(), self.path.display());
        Ok(issues)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Parse a JSON array, or JSON lines when the content is not an array
///
/// In JSON-lines mode blank lines are ignored and malformed or ID-less
/// lines are skipped with a warning. A malformed array fails as a whole.
pub fn parse_issues(content: &str) -> Result<Vec<Issue>, SourceError> {
    let content = content.trim_start_matches(BOM);
    if content.trim_start().starts_with('[') {
        let issues: Vec<Issue> =
            serde_json::from_str(content).map_err(|source| SourceError::Parse {
                line: source.line(),
                source,
            })?;
        return Ok(issues.into_iter().filter(|i| !i.id.is_empty()).collect());
    }

    let mut issues = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Issue>(line) {
            Ok(issue) if issue.id.is_empty() => {
                tracing::warn!("Skipping issue without an id on line {}", idx + 1);
            }
            Ok(issue) => issues.push(issue),
            Err(err) => {
                tracing::warn!("Skipping malformed JSON on line {}: {err}", idx + 1);
            }
        }
    }
    Ok(issues)
}
