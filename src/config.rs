//! Link targets and release defaults.
//!
//! Link targets can be overridden through environment variables so that a
//! project can point ticket references at its own tracker.

use std::env;

use tracing::warn;

/// Default relative path prefix for commit links.
pub const DEFAULT_COMMIT_URL: &str = "../../commit/";

/// Default relative path prefix for issue links.
pub const DEFAULT_ISSUE_URL: &str = "../../issues/";

/// Default prefix for external ticket tracker links.
pub const DEFAULT_TICKET_URL: &str = "https://jira.railsc.ru/browse/";

const COMMIT_URL_ENV_VAR: &str = "RELMAN_COMMIT_URL";
const ISSUE_URL_ENV_VAR: &str = "RELMAN_ISSUE_URL";
const TICKET_URL_ENV_VAR: &str = "RELMAN_TICKET_URL";

/// Default changelog file name.
pub const DEFAULT_CHANGELOG: &str = "CHANGELOG.md";

/// URL prefixes used when rendering commit, issue and ticket links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTargets {
    pub commit_url: String,
    pub issue_url: String,
    pub ticket_url: String,
}

impl Default for LinkTargets {
    fn default() -> Self {
        Self {
            commit_url: DEFAULT_COMMIT_URL.to_string(),
            issue_url: DEFAULT_ISSUE_URL.to_string(),
            ticket_url: DEFAULT_TICKET_URL.to_string(),
        }
    }
}

impl LinkTargets {
    /// Build link targets from the defaults and any `RELMAN_*_URL` overrides.
    pub fn from_env() -> Self {
        Self {
            commit_url: env_or_default(COMMIT_URL_ENV_VAR, DEFAULT_COMMIT_URL),
            issue_url: env_or_default(ISSUE_URL_ENV_VAR, DEFAULT_ISSUE_URL),
            ticket_url: env_or_default(TICKET_URL_ENV_VAR, DEFAULT_TICKET_URL),
        }
    }
}

fn env_or_default(var: &str, default: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v,
        Ok(_) => {
            warn!("{} is set but empty, using default '{}'", var, default);
            default.to_string()
        }
        Err(_) => default.to_string(),
    }
}

/// Options shared by the release commands, derived from CLI flags.
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    pub version: Option<semver::Version>,
    pub remote: String,
    pub branch: String,
    pub bump: bool,
    pub changelog: bool,
    pub pull: bool,
    pub push: bool,
    pub quiet: bool,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            version: None,
            remote: "origin".to_string(),
            branch: "master".to_string(),
            bump: true,
            changelog: true,
            pull: true,
            push: true,
            quiet: false,
        }
    }
}
