//! Well-known file and directory names of a package project.

use std::path::Path;

/// Standard project filesystem markers and paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WfpmPath {
    /// The `.wfpm` file marking a project root
    ProjectMarker,
    /// The `pkg.json` manifest inside each package directory
    PackageManifest,
    /// The `pkg-release.json` manifest published with each release
    ReleaseManifest,
    /// The `tests` directory inside each package
    TestsDir,
    /// The `checker.nf` script inside a package's tests directory
    CheckerScript,
}

impl WfpmPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectMarker => ".wfpm",
            Self::PackageManifest => "pkg.json",
            Self::ReleaseManifest => "pkg-release.json",
            Self::TestsDir => "tests",
            Self::CheckerScript => "checker.nf",
        }
    }
}

impl AsRef<Path> for WfpmPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for WfpmPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for WfpmPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
