//! Release workflow: changelog, version bump, tag, and the combined release.
//!
//! Each step shells out to git through a [`GitExecutor`] so the sequence of
//! commands can be checked in tests without touching a real remote.

use std::path::{Path, PathBuf};

use semver::Version;
use tracing::{debug, info};

use crate::changelog::{
    Changelog, ChangelogConfig, ChangelogOutcome, CommitLog, TagSource, generate,
    write_changelog,
};
use crate::config::{DEFAULT_CHANGELOG, ReleaseConfig};
use crate::error::ReleaseError;
use crate::git::{GitExecutor, git_args};
use crate::version::{current_version, detect_version_files, update_version_file, validate_new_version};

/// What the changelog step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangelogStatus {
    /// The file was written and staged.
    Written(PathBuf),
    /// Dry run: the text that would have been written.
    Preview(String),
    /// No commits to list; the file was left alone.
    Empty,
    /// A requested tag bound does not exist; nothing was written.
    TagsNotFound,
}

impl ChangelogStatus {
    /// Whether the command should exit successfully. Both the write and the
    /// dry run fail when a requested tag is missing.
    pub fn is_success(&self) -> bool {
        !matches!(self, ChangelogStatus::TagsNotFound)
    }
}

/// Runs release steps for the project rooted at `root`.
pub struct Releaser<E, H> {
    config: ReleaseConfig,
    changelog: ChangelogConfig,
    changelog_path: PathBuf,
    root: PathBuf,
    git: E,
    history: H,
}

impl<E, H> Releaser<E, H>
where
    E: GitExecutor,
    H: TagSource + CommitLog,
{
    pub fn new(
        root: impl Into<PathBuf>,
        config: ReleaseConfig,
        changelog: ChangelogConfig,
        git: E,
        history: H,
    ) -> Self {
        let root = root.into();
        Self {
            changelog_path: root.join(DEFAULT_CHANGELOG),
            root,
            config,
            changelog,
            git,
            history,
        }
    }

    /// Write the changelog somewhere other than `CHANGELOG.md` in the root.
    pub fn with_changelog_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.changelog_path = if path.is_absolute() {
            path
        } else {
            self.root.join(path)
        };
        self
    }

    /// Generate the changelog without writing it.
    pub fn preview_changelog(&self) -> Result<ChangelogStatus, ReleaseError> {
        let Some(changelog) = self.render_changelog()? else {
            return Ok(ChangelogStatus::TagsNotFound);
        };

        if changelog.is_empty() {
            return Ok(ChangelogStatus::Empty);
        }
        Ok(ChangelogStatus::Preview(changelog.render()))
    }

    /// Generate the changelog, write it and stage it.
    pub fn changelog(&self) -> Result<ChangelogStatus, ReleaseError> {
        let Some(changelog) = self.render_changelog()? else {
            return Ok(ChangelogStatus::TagsNotFound);
        };

        if !write_changelog(&self.changelog_path, &changelog)? {
            self.log("Changelog is empty, nothing to write");
            return Ok(ChangelogStatus::Empty);
        }

        self.stage(&self.changelog_path)?;
        self.log("Changelog generated");

        Ok(ChangelogStatus::Written(self.changelog_path.clone()))
    }

    /// The version currently recorded in the project's version files.
    pub fn current(&self) -> Result<Version, ReleaseError> {
        Ok(current_version(&self.root)?)
    }

    /// Validate the requested version, rewrite the version files, update the
    /// changelog and commit.
    pub fn bump(&self) -> Result<(), ReleaseError> {
        let version = self
            .config
            .version
            .clone()
            .ok_or(ReleaseError::MissingVersion)?;

        let files = detect_version_files(&self.root)?;
        if let Some(first) = files.first() {
            validate_new_version(&version, &first.current_version)?;
        }

        for file in &files {
            debug!(path = %file.path.display(), kind = %file.kind, "Updating version file");
            update_version_file(file, &version)?;

            self.stage(&file.path)?;
            self.log(&format!("Version updated to {}", version));
        }

        if self.config.changelog {
            self.changelog()?;
        }

        self.run_git(&["commit", "-m", &format!("Release {}", version)])?;

        if self.config.push {
            self.run_git(&["push", &self.config.remote, &self.config.branch])?;
            self.log("Changes pushed to repository");
        }

        Ok(())
    }

    /// Create an annotated `v<version>` tag, falling back to the current
    /// version when none was requested.
    pub fn tag(&self) -> Result<String, ReleaseError> {
        let version = match &self.config.version {
            Some(version) => version.clone(),
            None => self.current()?,
        };
        let tag_name = format!("v{}", version);

        self.run_git(&["tag", "-a", "-m", &format!("Version {}", version), &tag_name])?;
        if self.config.push {
            self.run_git(&["push", "--tags", &self.config.remote])?;
        }

        self.log(&format!("Git tag generated to {}", tag_name));
        Ok(tag_name)
    }

    /// Pull, bump and tag.
    pub fn release(&self) -> Result<String, ReleaseError> {
        if self.config.pull {
            self.pull_latest()?;
        }

        if self.config.bump {
            self.bump()?;
        }

        self.tag()
    }

    /// Render the changelog, printing the known tags when a bound is missing.
    fn render_changelog(&self) -> Result<Option<Changelog>, ReleaseError> {
        match generate(&self.changelog, &self.history, &self.history)? {
            ChangelogOutcome::Rendered(changelog) => Ok(Some(changelog)),
            ChangelogOutcome::TagsNotFound(not_found) => {
                println!("{}", not_found);
                Ok(None)
            }
        }
    }

    fn pull_latest(&self) -> Result<(), ReleaseError> {
        self.run_git(&["pull", &self.config.remote, &self.config.branch])?;
        self.run_git(&["fetch", "--tags", &self.config.remote])?;
        Ok(())
    }

    /// `git add` a file, by its path relative to the root when it has one.
    fn stage(&self, path: &Path) -> Result<(), ReleaseError> {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.run_git(&["add", &relative.to_string_lossy()])?;
        Ok(())
    }

    fn run_git(&self, args: &[&str]) -> Result<String, ReleaseError> {
        let args = git_args(args);
        self.log(&format!(">> git {}", args.join(" ")));

        let output = self.git.run(&args)?;
        if !output.is_empty() && !self.config.quiet {
            println!("{}", output);
        }
        Ok(output)
    }

    fn log(&self, message: &str) {
        info!("{}", message);
        if !self.config.quiet {
            println!("{}", message);
        }
    }
}
