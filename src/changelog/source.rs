//! History collaborators the changelog engine reads from.

use crate::error::GitError;

use super::range::LogRange;

/// A single commit as it appears in the changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEntry {
    /// Author date, `YYYY-MM-DD`.
    pub date: String,
    /// Abbreviated commit hash.
    pub short_hash: String,
    pub author: String,
    /// First line of the commit message.
    pub subject: String,
}

impl CommitEntry {
    /// Format the entry as a changelog bullet line.
    pub fn to_line(&self, commit_url: &str) -> String {
        format!(
            " * {} [{}]({}{}) - __({})__ {}",
            self.date, self.short_hash, commit_url, self.short_hash, self.author, self.subject
        )
    }
}

/// Provides the repository's tags in chronological order, oldest first.
pub trait TagSource {
    fn list_tags(&self) -> Result<Vec<String>, GitError>;
}

/// Provides the commits in a range, newest first.
pub trait CommitLog {
    fn commit_log(&self, range: &LogRange) -> Result<Vec<CommitEntry>, GitError>;
}
