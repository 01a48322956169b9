//! Changelog generation entry point and file output.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::LinkTargets;
use crate::error::ChangelogError;

use super::range::{TagNotFound, resolve};
use super::render::{Section, render_section};
use super::source::{CommitLog, TagSource};

/// What to generate: the tag bounds and where links point.
#[derive(Debug, Clone, Default)]
pub struct ChangelogConfig {
    /// Oldest tag to include.
    pub from: Option<String>,
    /// Newest tag to include. Without it an unreleased section is added.
    pub to: Option<String>,
    pub links: LinkTargets,
}

/// A fully rendered changelog, newest section first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changelog {
    pub sections: Vec<Section>,
}

impl Changelog {
    /// True when no section has any commit line.
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.lines.is_empty())
    }

    /// File contents: every section preceded by a blank line.
    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(|section| format!("\n{}", section.to_markdown()))
            .collect()
    }
}

/// Result of a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangelogOutcome {
    Rendered(Changelog),
    /// `from` or `to` did not name a known tag; nothing was rendered.
    TagsNotFound(TagNotFound),
}

/// Build the changelog for `config` from the given history.
///
/// Sections are rendered one at a time in output order. The first failing
/// log fetch aborts the whole run.
pub fn generate<S, L>(
    config: &ChangelogConfig,
    tags: &S,
    log: &L,
) -> Result<ChangelogOutcome, ChangelogError>
where
    S: TagSource + ?Sized,
    L: CommitLog + ?Sized,
{
    let all_tags = tags.list_tags().map_err(ChangelogError::TagsUnavailable)?;
    debug!(count = all_tags.len(), "Listed tags");

    let boundaries = match resolve(&all_tags, config.from.as_deref(), config.to.as_deref()) {
        Ok(boundaries) => boundaries,
        Err(not_found) => return Ok(ChangelogOutcome::TagsNotFound(not_found)),
    };

    let sections = boundaries
        .iter()
        .map(|boundary| render_section(boundary, log, &config.links))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ChangelogOutcome::Rendered(Changelog { sections }))
}

/// Write `changelog` to `path`, replacing any previous contents.
///
/// Nothing is written when the changelog has no commit lines. A new file is
/// created directly, so the umask applies. An existing file is replaced by
/// writing a temporary sibling with the same permissions and renaming it into
/// place. Returns whether the file was written.
pub fn write_changelog(path: &Path, changelog: &Changelog) -> Result<bool, ChangelogError> {
    if changelog.is_empty() {
        info!(path = %path.display(), "Changelog is empty, not writing");
        return Ok(false);
    }

    let write_failed = |source: std::io::Error| ChangelogError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let permissions = match std::fs::metadata(path) {
        Ok(metadata) => metadata.permissions(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            std::fs::write(path, changelog.render()).map_err(write_failed)?;
            debug!(path = %path.display(), "Created changelog");
            return Ok(true);
        }
        Err(e) => return Err(write_failed(e)),
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(write_failed)?;
    file.write_all(changelog.render().as_bytes())
        .map_err(write_failed)?;
    file.as_file()
        .set_permissions(permissions)
        .map_err(write_failed)?;
    file.persist(path).map_err(|e| write_failed(e.error))?;

    debug!(path = %path.display(), "Wrote changelog");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::range::SectionHeader;

    fn section(header: SectionHeader, lines: &[&str]) -> Section {
        Section {
            header,
            lines: lines.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_render_separates_sections_with_blank_lines() {
        let changelog = Changelog {
            sections: vec![
                section(SectionHeader::Unreleased, &[" * a"]),
                section(SectionHeader::Tag("v1".to_string()), &[" * b", " * c"]),
            ],
        };

        assert_eq!(
            changelog.render(),
            "\n#### [Current]\n * a\n\n#### v1\n * b\n * c\n"
        );
    }

    #[test]
    fn test_is_empty_ignores_headers() {
        let changelog = Changelog {
            sections: vec![section(SectionHeader::Unreleased, &[])],
        };
        assert!(changelog.is_empty());
    }

    #[test]
    fn test_write_changelog_skips_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        let changelog = Changelog {
            sections: vec![section(SectionHeader::Unreleased, &[])],
        };

        assert!(!write_changelog(&path, &changelog).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_write_changelog_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        std::fs::write(&path, "old contents\n").unwrap();

        let changelog = Changelog {
            sections: vec![section(SectionHeader::Tag("v2".to_string()), &[" * x"])],
        };

        assert!(write_changelog(&path, &changelog).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "\n#### v2\n * x\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_changelog_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        std::fs::write(&path, "old contents\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let changelog = Changelog {
            sections: vec![section(SectionHeader::Tag("v2".to_string()), &[" * x"])],
        };
        assert!(write_changelog(&path, &changelog).unwrap());

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "\n#### v2\n * x\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_changelog_new_file_is_not_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CHANGELOG.md");
        let changelog = Changelog {
            sections: vec![section(SectionHeader::Unreleased, &[" * x"])],
        };
        assert!(write_changelog(&path, &changelog).unwrap());

        // Created with 0o666 minus the umask, not tempfile's 0o600.
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        let reference = dir.path().join("reference");
        std::fs::write(&reference, "").unwrap();
        let expected = std::fs::metadata(&reference).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, expected);
    }
}
