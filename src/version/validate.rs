//! Release version validation.

use semver::Version;

use crate::error::VersionError;

/// The version every new package starts at.
pub const INITIAL_VERSION: Version = Version::new(0, 1, 0);

/// Parse a version, accepting an optional leading `v`.
pub fn parse_version(input: &str) -> Result<Version, VersionError> {
    let raw = input.trim();
    let raw = raw.strip_prefix('v').unwrap_or(raw);
    Version::parse(raw).map_err(|e| VersionError::ParseFailed(input.to_string(), e))
}

/// Check that `new` may be released on top of `current`.
///
/// - Anything below 0.1.0 is rejected.
/// - 0.1.0 is always accepted (first release).
/// - Otherwise `new` must be strictly greater than `current`.
pub fn validate_new_version(new: &Version, current: &Version) -> Result<(), VersionError> {
    if *new < INITIAL_VERSION {
        return Err(VersionError::BelowInitial(new.clone()));
    }

    if *new == INITIAL_VERSION || new > current {
        return Ok(());
    }

    Err(VersionError::NotIncreasing {
        new: new.clone(),
        current: current.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_prefix() {
        assert_eq!(parse_version("v1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse_version(" 1.2.3 ").unwrap(), Version::new(1, 2, 3));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(
            parse_version("1.2"),
            Err(VersionError::ParseFailed(_, _))
        ));
    }

    #[test]
    fn test_below_initial_rejected() {
        let result = validate_new_version(&Version::new(0, 0, 1), &Version::new(0, 0, 0));
        assert!(matches!(result, Err(VersionError::BelowInitial(_))));
    }

    #[test]
    fn test_initial_always_accepted() {
        assert!(validate_new_version(&INITIAL_VERSION, &Version::new(3, 0, 0)).is_ok());
    }

    #[test]
    fn test_must_increase() {
        let current = Version::new(3, 0, 0);
        assert!(validate_new_version(&Version::new(4, 0, 0), &current).is_ok());
        assert!(matches!(
            validate_new_version(&Version::new(3, 0, 0), &current),
            Err(VersionError::NotIncreasing { .. })
        ));
        assert!(matches!(
            validate_new_version(&Version::new(0, 2, 1), &current),
            Err(VersionError::NotIncreasing { .. })
        ));
    }

    #[test]
    fn test_prerelease_below_release() {
        let current = Version::new(1, 0, 0);
        let rc = Version::parse("1.0.0-rc.1").unwrap();
        assert!(validate_new_version(&rc, &current).is_err());
    }
}
