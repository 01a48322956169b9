//! Error types for relman modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to find reference '{0}': {1}")]
    ReferenceNotFound(String, #[source] git2::Error),

    #[error("Failed to list tags: {0}")]
    ListTags(#[source] git2::Error),

    #[error("Failed to parse commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Commit {hash} has invalid timestamp (seconds={seconds})")]
    InvalidTimestamp { hash: String, seconds: i64 },

    #[error("git executable not found in PATH")]
    NotInstalled,

    #[error("Failed to spawn git: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error("git {command} exited with code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },
}

/// Errors from changelog generation.
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Failed to fetch commit log for {range}: {source}")]
    FetchFailed {
        range: String,
        #[source]
        source: GitError,
    },

    #[error("Failed to list tags: {0}")]
    TagsUnavailable(#[source] GitError),

    #[error("Failed to write changelog {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from version validation and version file handling.
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Failed to parse version '{0}': {1}")]
    ParseFailed(String, #[source] semver::Error),

    #[error("New packages should be released with version 0.1.0 (got {0})")]
    BelowInitial(semver::Version),

    #[error("New version {new} is less than or equal to current version {current}")]
    NotIncreasing {
        new: semver::Version,
        current: semver::Version,
    },

    #[error("No version file found (looked for Cargo.toml, package.json, lib/**/version.rb)")]
    NoVersionFiles,

    #[error("Failed to update version file {path}: {reason}")]
    FileUpdateFailed { path: PathBuf, reason: String },
}

/// Errors from the release pipeline.
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("A release version is required for this command (use --set-version)")]
    MissingVersion,

    #[error("Release cancelled by user")]
    Cancelled,
}
