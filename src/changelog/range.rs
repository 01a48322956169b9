//! Tag range resolution.
//!
//! Turns the chronological tag list plus optional `from`/`to` bounds into the
//! ordered list of changelog sections, newest first.

use std::fmt;

/// Header of a changelog section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionHeader {
    /// Commits after the newest tag in the working set.
    Unreleased,
    /// Commits released under the given tag.
    Tag(String),
}

/// Literal header used for the unreleased section.
pub const UNRELEASED_HEADER: &str = "[Current]";

impl fmt::Display for SectionHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionHeader::Unreleased => f.write_str(UNRELEASED_HEADER),
            SectionHeader::Tag(name) => f.write_str(name),
        }
    }
}

/// A commit range in `since..until` form.
///
/// `since == None` means from the start of history, `until == None` means
/// through `HEAD`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogRange {
    pub since: Option<String>,
    pub until: Option<String>,
}

impl LogRange {
    pub fn new(since: Option<&str>, until: Option<&str>) -> Self {
        Self {
            since: since.map(str::to_string),
            until: until.map(str::to_string),
        }
    }
}

impl fmt::Display for LogRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let until = self.until.as_deref().unwrap_or("HEAD");
        match &self.since {
            Some(since) => write!(f, "{}..{}", since, until),
            None => f.write_str(until),
        }
    }
}

/// One changelog section to render: its header and the commits it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Boundary {
    pub header: SectionHeader,
    pub range: LogRange,
}

/// Raised when `from` or `to` names a tag the repository does not have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagNotFound {
    /// The requested tags that were not found.
    pub missing: Vec<String>,
    /// Every tag the repository has, oldest first.
    pub available: Vec<String>,
}

impl fmt::Display for TagNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Could not find the given tags ({}). Make sure that given tags exist.",
            self.missing.join(", ")
        )?;
        write!(f, "Listing found tags:")?;
        for tag in &self.available {
            write!(f, "\n{}", tag)?;
        }
        Ok(())
    }
}

/// Resolve the sections to render for `tags` (oldest first).
///
/// - `from` and `to` restrict the tags to the inclusive slice between them.
/// - Without `to`, a leading unreleased section covers `<newest tag>..HEAD`.
/// - With only `from`, the oldest section starts at the tag before `from`;
///   otherwise it starts at the beginning of history.
pub fn resolve(
    tags: &[String],
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Vec<Boundary>, TagNotFound> {
    let mut missing = Vec::new();
    let mut locate = |name: Option<&str>| {
        let name = name?;
        let index = tags.iter().position(|t| t == name);
        if index.is_none() {
            missing.push(name.to_string());
        }
        index
    };

    let from_index = locate(from);
    let to_index = locate(to);

    if !missing.is_empty() {
        return Err(TagNotFound {
            missing,
            available: tags.to_vec(),
        });
    }

    let mut previous_begin: Option<&str> = None;
    let working: &[String] = match (from_index, to_index) {
        (Some(start), Some(end)) if start <= end => &tags[start..=end],
        (Some(_), Some(_)) => &[],
        (Some(start), None) => {
            previous_begin = start.checked_sub(1).map(|i| tags[i].as_str());
            &tags[start..]
        }
        (None, Some(end)) => &tags[..=end],
        (None, None) => tags,
    };

    let mut boundaries = Vec::with_capacity(working.len() + 1);

    if to.is_none() {
        boundaries.push(Boundary {
            header: SectionHeader::Unreleased,
            range: LogRange::new(working.last().map(String::as_str), None),
        });
    }

    let mut newer: Option<&str> = None;
    for tag in working.iter().rev() {
        if let Some(newer) = newer {
            boundaries.push(Boundary {
                header: SectionHeader::Tag(newer.to_string()),
                range: LogRange::new(Some(tag.as_str()), Some(newer)),
            });
        }
        newer = Some(tag.as_str());
    }

    if let Some(oldest) = newer {
        boundaries.push(Boundary {
            header: SectionHeader::Tag(oldest.to_string()),
            range: LogRange::new(previous_begin, Some(oldest)),
        });
    }

    Ok(boundaries)
}
