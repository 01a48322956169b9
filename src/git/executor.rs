//! Mutating git operations: add, commit, tag, push, pull.
//!
//! These shell out to the system `git` binary so the user's own config,
//! SSH agent and credential helpers apply.

use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::error::GitError;

/// Runs git subcommands.
///
/// This abstraction allows mocking git in tests.
#[cfg_attr(test, mockall::automock)]
pub trait GitExecutor {
    /// Run `git <args>` and return its trimmed standard output.
    fn run(&self, args: &[String]) -> Result<String, GitError>;
}

/// Executor that calls the real `git` binary inside a working directory.
pub struct SystemGit {
    workdir: PathBuf,
}

impl SystemGit {
    /// Create an executor for `workdir`, checking that `git` is installed.
    pub fn new(workdir: impl Into<PathBuf>) -> Result<Self, GitError> {
        if which::which("git").is_err() {
            return Err(GitError::NotInstalled);
        }
        Ok(Self {
            workdir: workdir.into(),
        })
    }
}

impl GitExecutor for SystemGit {
    fn run(&self, args: &[String]) -> Result<String, GitError> {
        debug!(args = ?args, workdir = %self.workdir.display(), "Running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(GitError::SpawnFailed)?;

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Convert borrowed arguments for [`GitExecutor::run`].
pub fn git_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}
