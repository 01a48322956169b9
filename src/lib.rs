//! relman - release management for git repositories.
//!
//! # Overview
//!
//! relman generates a Markdown changelog from a repository's annotated tags
//! and commit history, and drives the release steps around it: bumping
//! version files, committing, tagging and pushing.

pub mod changelog;
pub mod config;
pub mod error;
pub mod git;
pub mod release;
pub mod version;

// Re-export commonly used types
pub use changelog::{Changelog, ChangelogConfig, ChangelogOutcome};
pub use config::{LinkTargets, ReleaseConfig};
pub use error::{ChangelogError, GitError, ReleaseError, VersionError};
pub use release::{ChangelogStatus, Releaser};
