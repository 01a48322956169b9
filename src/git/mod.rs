//! Git access: history reads via git2-rs, mutations via the git binary.

pub mod executor;
pub mod history;

pub use executor::{GitExecutor, SystemGit, git_args};
#[cfg(test)]
pub use executor::MockGitExecutor;
pub use history::GitHistory;
