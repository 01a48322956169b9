//! Section rendering.

use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::debug;

use crate::config::LinkTargets;
use crate::error::ChangelogError;

use super::links::rewrite_line;
use super::range::{Boundary, SectionHeader};
use super::source::{CommitEntry, CommitLog};

static MERGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Merge (branch|pull)").expect("merge pattern is valid"));

/// A rendered changelog section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub header: SectionHeader,
    /// Bullet lines, newest commit first, with links already rewritten.
    pub lines: Vec<String>,
}

impl Section {
    /// Markdown for this section: a level-4 header followed by its lines.
    pub fn to_markdown(&self) -> String {
        let mut text = format!("#### {}\n", self.header);
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

/// Whether a commit subject marks a branch or pull request merge.
pub fn is_merge_subject(subject: &str) -> bool {
    MERGE_RE.is_match(subject)
}

/// Fetch the commits for `boundary` and render them as a section.
///
/// Merge commits are dropped. A log failure is returned as-is; nothing is
/// retried.
pub fn render_section<L: CommitLog + ?Sized>(
    boundary: &Boundary,
    log: &L,
    links: &LinkTargets,
) -> Result<Section, ChangelogError> {
    let entries = log
        .commit_log(&boundary.range)
        .map_err(|source| ChangelogError::FetchFailed {
            range: boundary.range.to_string(),
            source,
        })?;

    let lines: Vec<String> = entries
        .iter()
        .filter(|entry| !is_merge_subject(&entry.subject))
        .map(|entry| render_line(entry, links))
        .collect();

    debug!(
        header = %boundary.header,
        range = %boundary.range,
        commits = entries.len(),
        rendered = lines.len(),
        "Rendered changelog section"
    );

    Ok(Section {
        header: boundary.header.clone(),
        lines,
    })
}

fn render_line(entry: &CommitEntry, links: &LinkTargets) -> String {
    rewrite_line(&entry.to_line(&links.commit_url), links)
}
