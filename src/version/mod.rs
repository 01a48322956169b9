//! Release version validation and version file updates.

pub mod validate;
pub mod version_files;

pub use validate::{INITIAL_VERSION, parse_version, validate_new_version};
pub use version_files::{
    VersionFile, VersionFileKind, current_version, detect_version_files, update_version_file,
};
