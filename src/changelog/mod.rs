//! Changelog generation from tags and commit history.
//!
//! The repository's tags split history into sections, newest first. Each
//! section lists its commits, with merge commits dropped and issue and
//! ticket references turned into links.

pub mod generator;
pub mod links;
pub mod range;
pub mod render;
pub mod source;

pub use generator::{Changelog, ChangelogConfig, ChangelogOutcome, generate, write_changelog};
pub use range::{Boundary, LogRange, SectionHeader, TagNotFound, resolve};
pub use render::Section;
pub use source::{CommitEntry, CommitLog, TagSource};
