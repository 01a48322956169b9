//! Version file detection and update.
//!
//! Supports Cargo.toml, package.json, and `VERSION = '...'` constants in
//! `lib/**/version.rb`.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex_lite::{Captures, Regex};
use semver::Version;
use tracing::debug;

use crate::error::VersionError;

/// Glob, relative to the project root, for version constant files.
pub const VERSION_CONSTANT_GLOB: &str = "lib/**/version.rb";

static CONSTANT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"VERSION\s*=\s*(?:'([^'\n]*)'|"([^"\n]*)")"#)
        .expect("version constant pattern is valid")
});

/// The kind of version file detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionFileKind {
    CargoToml,
    PackageJson,
    VersionConstant,
}

impl std::fmt::Display for VersionFileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionFileKind::CargoToml => write!(f, "Cargo.toml"),
            VersionFileKind::PackageJson => write!(f, "package.json"),
            VersionFileKind::VersionConstant => write!(f, "VERSION constant"),
        }
    }
}

/// A detected version file with its current version.
#[derive(Debug, Clone)]
pub struct VersionFile {
    pub path: PathBuf,
    pub kind: VersionFileKind,
    pub current_version: Version,
}

/// Detect version files in the project root.
///
/// Order: Cargo.toml, package.json, then version constant files sorted by
/// path. Files without a parseable version are skipped. Returns
/// `VersionError::NoVersionFiles` if none are found.
pub fn detect_version_files(root: &Path) -> Result<Vec<VersionFile>, VersionError> {
    let mut files = Vec::new();

    let cargo_path = root.join("Cargo.toml");
    if cargo_path.exists() {
        if let Some(version) = read_cargo_version(&cargo_path)? {
            files.push(VersionFile {
                path: cargo_path,
                kind: VersionFileKind::CargoToml,
                current_version: version,
            });
        }
    }

    let package_path = root.join("package.json");
    if package_path.exists() {
        if let Some(version) = read_package_json_version(&package_path)? {
            files.push(VersionFile {
                path: package_path,
                kind: VersionFileKind::PackageJson,
                current_version: version,
            });
        }
    }

    for path in find_version_constants(root)? {
        if let Some(version) = read_constant_version(&path)? {
            files.push(VersionFile {
                path,
                kind: VersionFileKind::VersionConstant,
                current_version: version,
            });
        }
    }

    if files.is_empty() {
        return Err(VersionError::NoVersionFiles);
    }

    Ok(files)
}

/// The project's current version: the version of the first detected file.
pub fn current_version(root: &Path) -> Result<Version, VersionError> {
    let files = detect_version_files(root)?;
    files
        .into_iter()
        .next()
        .map(|file| file.current_version)
        .ok_or(VersionError::NoVersionFiles)
}

/// Update a version file to the new version.
pub fn update_version_file(file: &VersionFile, new_version: &Version) -> Result<(), VersionError> {
    match file.kind {
        VersionFileKind::CargoToml => update_cargo_toml(&file.path, new_version),
        VersionFileKind::PackageJson => update_package_json(&file.path, new_version),
        VersionFileKind::VersionConstant => update_version_constant(&file.path, new_version),
    }
}

// --- Cargo.toml ---

fn read_cargo_version(path: &Path) -> Result<Option<Version>, VersionError> {
    let content = read_file(path)?;
    let doc = parse_toml(path, &content)?;

    let version = doc
        .get("package")
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str());

    Ok(version.and_then(|s| Version::parse(s).ok()))
}

fn update_cargo_toml(path: &Path, new_version: &Version) -> Result<(), VersionError> {
    let content = read_file(path)?;
    let mut doc = parse_toml(path, &content)?;

    doc["package"]["version"] = toml_edit::value(new_version.to_string());

    write_file(path, &doc.to_string())
}

fn parse_toml(path: &Path, content: &str) -> Result<toml_edit::DocumentMut, VersionError> {
    content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| update_failed(path, format!("Invalid TOML: {}", e)))
}

// --- package.json ---

fn read_package_json_version(path: &Path) -> Result<Option<Version>, VersionError> {
    let json = parse_json(path, &read_file(path)?)?;
    let version = json.get("version").and_then(|v| v.as_str());

    Ok(version.and_then(|s| Version::parse(s).ok()))
}

fn update_package_json(path: &Path, new_version: &Version) -> Result<(), VersionError> {
    let mut json = parse_json(path, &read_file(path)?)?;

    json["version"] = serde_json::Value::String(new_version.to_string());

    let output = serde_json::to_string_pretty(&json)
        .map_err(|e| update_failed(path, format!("Failed to serialize JSON: {}", e)))?;

    // npm uses trailing newline
    write_file(path, &format!("{}\n", output))
}

fn parse_json(path: &Path, content: &str) -> Result<serde_json::Value, VersionError> {
    serde_json::from_str(content).map_err(|e| update_failed(path, format!("Invalid JSON: {}", e)))
}

// --- VERSION constants ---

fn find_version_constants(root: &Path) -> Result<Vec<PathBuf>, VersionError> {
    let pattern = root.join(VERSION_CONSTANT_GLOB);
    let pattern = pattern.to_string_lossy();

    let entries = glob::glob(&pattern)
        .map_err(|e| update_failed(root, format!("Invalid glob pattern: {}", e)))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(error = %e, "Skipping unreadable path while searching for version files");
                None
            }
        })
        .collect();
    paths.sort();

    Ok(paths)
}

fn constant_value<'h>(caps: &Captures<'h>) -> Option<&'h str> {
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

fn read_constant_version(path: &Path) -> Result<Option<Version>, VersionError> {
    let content = read_file(path)?;

    Ok(CONSTANT_RE
        .captures(&content)
        .and_then(|caps| constant_value(&caps).map(str::to_string))
        .and_then(|s| Version::parse(&s).ok()))
}

/// Replace the quoted value of every `VERSION = '...'` assignment, keeping the
/// quote style and anything after the closing quote.
fn update_version_constant(path: &Path, new_version: &Version) -> Result<(), VersionError> {
    let content = read_file(path)?;

    if !CONSTANT_RE.is_match(&content) {
        return Err(update_failed(path, "No VERSION constant found".to_string()));
    }

    let updated = CONSTANT_RE.replace_all(&content, |caps: &Captures| {
        let quote = if caps.get(1).is_some() { '\'' } else { '"' };
        format!("VERSION = {quote}{new_version}{quote}")
    });

    write_file(path, &updated)
}

// --- Shared helpers ---

fn update_failed(path: &Path, reason: String) -> VersionError {
    VersionError::FileUpdateFailed {
        path: path.to_path_buf(),
        reason,
    }
}

fn read_file(path: &Path) -> Result<String, VersionError> {
    std::fs::read_to_string(path).map_err(|e| update_failed(path, format!("Failed to read: {}", e)))
}

fn write_file(path: &Path, content: &str) -> Result<(), VersionError> {
    std::fs::write(path, content).map_err(|e| update_failed(path, format!("Failed to write: {}", e)))
}
