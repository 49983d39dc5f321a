//! Name and version patterns for packages

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// Pattern every package name must match.
pub const PKG_NAME_PATTERN: &str = r"^[a-z][0-9a-z\-]*[0-9a-z]+$";

/// Pattern every package version must match: three or four numeric segments
/// with an optional pre-release suffix.
pub const PKG_VERSION_PATTERN: &str =
    r"^[0-9]+\.[0-9]+\.[0-9]+(?:\.[0-9]+)?(?:-[0-9a-z\.]+)?$";

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(PKG_NAME_PATTERN).unwrap());
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(PKG_VERSION_PATTERN).unwrap());

/// Whether `name` is a valid package name.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Whether `version` is a valid package version.
pub fn is_valid_version(version: &str) -> bool {
    VERSION_RE.is_match(version)
}

/// Validate a package name.
pub fn validate_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidName {
            name: name.to_string(),
            pattern: PKG_NAME_PATTERN,
        })
    }
}

/// Validate a package version.
pub fn validate_version(version: &str) -> Result<()> {
    if is_valid_version(version) {
        Ok(())
    } else {
        Err(Error::InvalidVersion {
            version: version.to_string(),
            pattern: PKG_VERSION_PATTERN,
        })
    }
}

/// Split a `name@version` full name. Returns `None` unless there is exactly
/// one `@` with text on both sides.
pub fn split_fullname(fullname: &str) -> Option<(&str, &str)> {
    let (name, version) = fullname.split_once('@')?;
    if name.is_empty() || version.is_empty() || version.contains('@') {
        return None;
    }
    Some((name, version))
}
