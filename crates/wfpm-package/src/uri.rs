//! Canonical package identity: `host/account/repo/name@version`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::naming::{split_fullname, validate_name, validate_version};
use crate::{Error, Result};

/// A parsed package URI, e.g. `github.com/icgc-argo/demo-wfpkgs/demo-utils@1.3.0`.
///
/// The repository account is case-insensitive and always stored lowercased,
/// so two URIs differing only in account case are the same package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageUri {
    host: String,
    account: String,
    repo: String,
    name: String,
    version: String,
}

impl PackageUri {
    /// Parse a package URI.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedUri`] if the URI is not four `/`-separated parts
    ///   ending in `name@version`
    /// - [`Error::InvalidName`] / [`Error::InvalidVersion`] if a component
    ///   fails its pattern
    pub fn parse(uri: &str) -> Result<Self> {
        let malformed = || Error::MalformedUri {
            uri: uri.to_string(),
        };

        let parts: Vec<&str> = uri.split('/').collect();
        let [host, account, repo, fullname] = parts.as_slice() else {
            return Err(malformed());
        };
        if host.is_empty() || account.is_empty() || repo.is_empty() {
            return Err(malformed());
        }
        let (name, version) = split_fullname(fullname).ok_or_else(malformed)?;

        Self::new(*host, *account, *repo, name, version)
    }

    /// Build a URI from its components, validating name and version.
    pub fn new(
        host: impl Into<String>,
        account: impl Into<String>,
        repo: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        let version = version.into();
        validate_name(&name)?;
        validate_version(&version)?;

        Ok(Self {
            host: host.into(),
            account: account.into().to_lowercase(),
            repo: repo.into(),
            name,
            version,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// `name@version`
    pub fn fullname(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }

    /// `host/account/repo`
    pub fn project_fullname(&self) -> String {
        format!("{}/{}/{}", self.host, self.account, self.repo)
    }

    /// Release tag in the current naming scheme: `name.vVERSION`.
    pub fn release_tag(&self) -> String {
        format!("{}.v{}", self.name, self.version)
    }

    /// Release tag in the legacy naming scheme: `name.VERSION`.
    pub fn legacy_release_tag(&self) -> String {
        format!("{}.{}", self.name, self.version)
    }

    /// Deterministic install location below `project_root`:
    /// `<module_dir>/<host>/<account>/<repo>/<name>@<version>`.
    pub fn install_path(&self, project_root: &Path, module_dir: &str) -> PathBuf {
        project_root
            .join(module_dir)
            .join(&self.host)
            .join(&self.account)
            .join(&self.repo)
            .join(self.fullname())
    }
}

impl fmt::Display for PackageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}@{}",
            self.host, self.account, self.repo, self.name, self.version
        )
    }
}

impl FromStr for PackageUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for PackageUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PackageUri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
