//! relman - CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dialoguer::Confirm;
use semver::Version;
use tracing_subscriber::EnvFilter;

use relman::changelog::ChangelogConfig;
use relman::config::{DEFAULT_CHANGELOG, LinkTargets, ReleaseConfig};
use relman::error::ReleaseError;
use relman::git::{GitHistory, SystemGit};
use relman::release::{ChangelogStatus, Releaser};
use relman::version::parse_version;

/// Generate changelogs and cut releases from git tags.
#[derive(Parser, Debug)]
#[command(name = "relman")]
#[command(about = "Generate changelogs and cut releases from git tags")]
#[command(version)]
struct Cli {
    /// Remote to pull from and push to
    #[arg(long, global = true, default_value = "origin")]
    remote: String,

    /// Branch to pull and push
    #[arg(long, global = true, default_value = "master")]
    branch: String,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the changelog and stage it
    Changelog(ChangelogArgs),

    /// Print the current version
    Current,

    /// Update version files, changelog, commit and push
    Bump(BumpArgs),

    /// Create an annotated version tag and push it
    Tag {
        /// Version to tag (defaults to the current version)
        #[arg(long = "set-version", value_parser = parse_version_arg)]
        version: Option<Version>,

        /// Do not push the tag
        #[arg(long)]
        no_push: bool,
    },

    /// Pull, bump and tag in one go
    Release {
        #[command(flatten)]
        bump: BumpArgs,

        /// Do not pull before releasing
        #[arg(long)]
        no_pull: bool,

        /// Only tag, without bumping version files
        #[arg(long)]
        no_bump: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct ChangelogArgs {
    /// Oldest tag to include
    #[arg(long)]
    from: Option<String>,

    /// Newest tag to include (without it, unreleased commits are listed)
    #[arg(long)]
    to: Option<String>,

    /// Path to changelog file
    #[arg(short = 'o', long, default_value = DEFAULT_CHANGELOG)]
    output: PathBuf,

    /// Dry run - print changelog without writing
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct BumpArgs {
    /// Version to release
    #[arg(long = "set-version", value_parser = parse_version_arg)]
    version: Option<Version>,

    /// Do not regenerate the changelog
    #[arg(long)]
    no_changelog: bool,

    /// Do not push the release commit
    #[arg(long)]
    no_push: bool,
}

fn parse_version_arg(s: &str) -> Result<Version, String> {
    parse_version(s).map_err(|e| e.to_string())
}

/// Console logging only; `RUST_LOG` overrides the default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let root = std::env::current_dir().context("Failed to read current directory")?;
    let history = GitHistory::discover(&root)
        .context("Not a git repository. Run relman from within a git repository.")?;
    let root = history
        .repository()
        .workdir()
        .map(Path::to_path_buf)
        .unwrap_or(root);
    let git = SystemGit::new(&root).context("git is required")?;

    let mut config = ReleaseConfig {
        remote: cli.remote,
        branch: cli.branch,
        quiet: cli.quiet,
        ..ReleaseConfig::default()
    };
    let mut changelog = ChangelogConfig {
        links: LinkTargets::from_env(),
        ..ChangelogConfig::default()
    };
    let mut output = PathBuf::from(DEFAULT_CHANGELOG);
    let mut dry_run = false;
    let mut confirm = false;

    match &cli.command {
        Command::Changelog(args) => {
            changelog.from = args.from.clone();
            changelog.to = args.to.clone();
            output = args.output.clone();
            dry_run = args.dry_run;
        }
        Command::Current => {}
        Command::Bump(args) => apply_bump_args(&mut config, args),
        Command::Tag { version, no_push } => {
            config.version = version.clone();
            config.push = !no_push;
        }
        Command::Release {
            bump,
            no_pull,
            no_bump,
            yes,
        } => {
            apply_bump_args(&mut config, bump);
            config.pull = !no_pull;
            config.bump = !no_bump;
            confirm = !yes;
        }
    }

    let releaser = Releaser::new(&root, config, changelog, git, history).with_changelog_path(output);

    match cli.command {
        Command::Changelog(_) => {
            let status = if dry_run {
                releaser.preview_changelog()
            } else {
                releaser.changelog()
            }
            .context("Failed to generate changelog")?;

            if let ChangelogStatus::Preview(text) = &status {
                println!("\n--- Dry Run Output ---");
                print!("{}", text);
            }
            if !status.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Current => {
            let version = releaser.current().context("Failed to read current version")?;
            println!("{}", version);
        }
        Command::Bump(_) => releaser.bump().context("Failed to bump version")?,
        Command::Tag { .. } => {
            releaser.tag().context("Failed to create tag")?;
        }
        Command::Release { .. } => {
            if confirm && !confirm_release()? {
                return Err(ReleaseError::Cancelled.into());
            }
            let tag = releaser.release().context("Release failed")?;
            println!("Released {}", tag);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn apply_bump_args(config: &mut ReleaseConfig, args: &BumpArgs) {
    config.version = args.version.clone();
    config.changelog = !args.no_changelog;
    config.push = !args.no_push;
}

fn confirm_release() -> Result<bool> {
    Confirm::new()
        .with_prompt("Pull, bump, tag and push this release?")
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}
