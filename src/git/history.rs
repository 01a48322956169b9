//! Tag listing and commit log reading using git2-rs.

use std::path::Path;

use chrono::{FixedOffset, TimeZone};
use git2::{Commit, ErrorCode, Oid, Repository, Sort};
use tracing::debug;

use crate::changelog::links::sanitize;
use crate::changelog::range::LogRange;
use crate::changelog::source::{CommitEntry, CommitLog, TagSource};
use crate::error::GitError;

/// Read-only view of a repository's tags and history.
pub struct GitHistory {
    repo: Repository,
}

impl GitHistory {
    /// Open the repository containing `path`.
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(GitError::OpenRepository)?;
        Ok(Self { repo })
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Resolve a tag, branch or hash to the commit it names.
    fn resolve_commit(&self, reference: &str) -> Result<Oid, GitError> {
        let object = self
            .repo
            .revparse_single(reference)
            .map_err(|e| GitError::ReferenceNotFound(reference.to_string(), e))?;
        let commit = object.peel_to_commit().map_err(GitError::ParseCommit)?;
        Ok(commit.id())
    }
}

impl TagSource for GitHistory {
    /// Annotated tags ordered by the author date of the commit they point to.
    ///
    /// Lightweight tags carry no tag object and are skipped.
    fn list_tags(&self) -> Result<Vec<String>, GitError> {
        let names = self.repo.tag_names(None).map_err(GitError::ListTags)?;
        let mut dated = Vec::with_capacity(names.len());

        for name in names.iter().flatten() {
            let reference = self
                .repo
                .find_reference(&format!("refs/tags/{}", name))
                .map_err(|e| GitError::ReferenceNotFound(name.to_string(), e))?;

            let Ok(tag) = reference.peel_to_tag() else {
                debug!(tag = %name, "Skipping lightweight tag");
                continue;
            };

            let commit = match tag.target().and_then(|target| target.peel_to_commit()) {
                Ok(commit) => commit,
                Err(e) => {
                    debug!(tag = %name, error = %e, "Skipping tag that does not point to a commit");
                    continue;
                }
            };

            dated.push((commit.author().when().seconds(), name.to_string()));
        }

        // Stable sort keeps name order for tags on commits with equal dates.
        dated.sort_by_key(|(seconds, _)| *seconds);

        Ok(dated.into_iter().map(|(_, name)| name).collect())
    }
}

impl CommitLog for GitHistory {
    fn commit_log(&self, range: &LogRange) -> Result<Vec<CommitEntry>, GitError> {
        let until = match range.until.as_deref() {
            Some(reference) => self.resolve_commit(reference)?,
            None => match self.repo.head() {
                Ok(head) => head.peel_to_commit().map_err(GitError::ParseCommit)?.id(),
                Err(e) if e.code() == ErrorCode::UnbornBranch => {
                    debug!("HEAD has no commits yet");
                    return Ok(Vec::new());
                }
                Err(e) => return Err(GitError::ReferenceNotFound("HEAD".to_string(), e)),
            },
        };

        let mut revwalk = self.repo.revwalk().map_err(GitError::RevwalkError)?;
        revwalk.set_sorting(Sort::TIME).map_err(GitError::RevwalkError)?;
        revwalk.push(until).map_err(GitError::RevwalkError)?;

        if let Some(since) = range.since.as_deref() {
            let since = self.resolve_commit(since)?;
            revwalk.hide(since).map_err(GitError::RevwalkError)?;
        }

        let mut entries = Vec::new();
        for oid in revwalk {
            let oid = oid.map_err(GitError::RevwalkError)?;
            let commit = self.repo.find_commit(oid).map_err(GitError::ParseCommit)?;
            entries.push(commit_entry(&commit)?);
        }

        debug!(range = %range, count = entries.len(), "Read commit log");
        Ok(entries)
    }
}

/// Build a changelog entry from a commit, dropping undecodable bytes.
fn commit_entry(commit: &Commit) -> Result<CommitEntry, GitError> {
    let author = commit.author();
    let when = author.when();

    let date = FixedOffset::east_opt(when.offset_minutes() * 60)
        .and_then(|offset| offset.timestamp_opt(when.seconds(), 0).single())
        .ok_or_else(|| GitError::InvalidTimestamp {
            hash: commit.id().to_string(),
            seconds: when.seconds(),
        })?
        .format("%Y-%m-%d")
        .to_string();

    let short_id = commit.as_object().short_id().map_err(GitError::ParseCommit)?;
    let short_hash = short_id
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| commit.id().to_string()[..7].to_string());

    Ok(CommitEntry {
        date,
        short_hash,
        author: sanitize(author.name_bytes()),
        subject: commit.summary_bytes().map(sanitize).unwrap_or_default(),
    })
}
