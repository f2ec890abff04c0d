//! Issue sources feeding the board

mod json_file;
mod traits;

pub use json_file::{parse_issues, JsonFileSource, DEFAULT_ISSUES_PATH};
pub use traits::{IssueSource, SourceError};

#[cfg(test)]
pub use traits::MockIssueSource;
