//! Package manifests: `pkg.json` for local packages, `pkg-release.json` for
//! released ones.
//!
//! # Example
//!
//! ```json
//! {
//!     "name": "fastqc",
//!     "version": "0.2.0",
//!     "main": "fastqc",
//!     "repository": {
//!         "type": "git",
//!         "url": "https://github.com/icgc-argo/demo-wfpkgs.git"
//!     },
//!     "dependencies": [
//!         "github.com/icgc-argo/demo-wfpkgs/demo-utils@1.3.0"
//!     ],
//!     "devDependencies": []
//! }
//! ```
//!
//! Fields not listed above are tolerated and ignored when reading, and kept
//! verbatim by [`rewrite_manifest_version`].

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use wfpm_fs::io;

use crate::naming::validate_version;
use crate::uri::PackageUri;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct RawManifest {
    name: String,
    version: String,
    main: String,
    repository: RawRepository,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    url: String,
}

/// Repository coordinates of a package, parsed from `repository.url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub host: String,
    pub account: String,
    pub repo: String,
}

impl Repository {
    /// Parse `scheme://host/account/repo.git`. The account is lowercased and
    /// the `.git` suffix dropped.
    pub fn from_url(url: &str) -> Result<Self> {
        let invalid = || Error::InvalidRepositoryUrl {
            url: url.to_string(),
        };

        let (_, rest) = url.split_once("://").ok_or_else(invalid)?;
        let parts: Vec<&str> = rest.split('/').collect();
        let [host, account, repo] = parts.as_slice() else {
            return Err(invalid());
        };
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        if host.is_empty() || account.is_empty() || repo.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            host: host.to_string(),
            account: account.to_lowercase(),
            repo: repo.to_string(),
        })
    }
}

/// Validated package metadata.
#[derive(Debug, Clone)]
pub struct Manifest {
    uri: PackageUri,
    main: String,
    repository: Repository,
    dependencies: BTreeSet<PackageUri>,
    dev_dependencies: BTreeSet<PackageUri>,
    dir: Option<PathBuf>,
}

impl Manifest {
    /// Load a manifest file and remember the directory containing it.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = io::read_text(path)?;
        let mut manifest = Self::from_json(&path.display().to_string(), &content)?;

        let dir = path
            .parent()
            .map(|p| fs::canonicalize(p).unwrap_or_else(|_| p.to_path_buf()));
        manifest.dir = dir;
        Ok(manifest)
    }

    /// Parse manifest JSON. `origin` names the source in error messages
    /// (a path or URL).
    pub fn from_json(origin: &str, content: &str) -> Result<Self> {
        let raw: RawManifest =
            serde_json::from_str(content).map_err(|e| Error::ManifestParse {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;

        let repository = Repository::from_url(&raw.repository.url)?;
        let uri = PackageUri::new(
            repository.host.as_str(),
            repository.account.as_str(),
            repository.repo.as_str(),
            raw.name,
            raw.version,
        )?;

        let invalid = |reason: String| Error::InvalidManifest {
            origin: origin.to_string(),
            reason,
        };

        let dependencies = parse_dependency_list(&raw.dependencies)
            .map_err(|r| invalid(format!("{r} in 'dependencies'")))?;
        let dev_dependencies = parse_dependency_list(&raw.dev_dependencies)
            .map_err(|r| invalid(format!("{r} in 'devDependencies'")))?;

        let overlap: Vec<String> = dependencies
            .intersection(&dev_dependencies)
            .map(ToString::to_string)
            .collect();
        if !overlap.is_empty() {
            return Err(invalid(format!(
                "Dependency duplicated in 'dependencies' and 'devDependencies': {}",
                overlap.join(", ")
            )));
        }

        tracing::debug!(
            package = %uri,
            dependencies = dependencies.len(),
            dev_dependencies = dev_dependencies.len(),
            "Loaded manifest"
        );

        Ok(Self {
            uri,
            main: raw.main,
            repository,
            dependencies,
            dev_dependencies,
            dir: None,
        })
    }

    pub fn uri(&self) -> &PackageUri {
        &self.uri
    }

    pub fn name(&self) -> &str {
        self.uri.name()
    }

    pub fn version(&self) -> &str {
        self.uri.version()
    }

    pub fn fullname(&self) -> String {
        self.uri.fullname()
    }

    /// The `main` entry as written in the manifest.
    pub fn main(&self) -> &str {
        &self.main
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn dependencies(&self) -> &BTreeSet<PackageUri> {
        &self.dependencies
    }

    pub fn dev_dependencies(&self) -> &BTreeSet<PackageUri> {
        &self.dev_dependencies
    }

    /// Union of runtime and development dependencies.
    pub fn all_dependencies(&self) -> BTreeSet<PackageUri> {
        self.dependencies
            .union(&self.dev_dependencies)
            .cloned()
            .collect()
    }

    /// Directory the manifest was loaded from, if it came from disk.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }
}

fn parse_dependency_list(entries: &[String]) -> std::result::Result<BTreeSet<PackageUri>, String> {
    let mut set = BTreeSet::new();
    let mut duplicates = Vec::new();

    for entry in entries {
        let uri = PackageUri::parse(entry)
            .map_err(|e| format!("Invalid dependency: {entry}. Message: {e}"))?;
        if !set.insert(uri) {
            duplicates.push(entry.as_str());
        }
    }

    if duplicates.is_empty() {
        Ok(set)
    } else {
        Err(format!("Duplicated dependencies found: {}", duplicates.join(", ")))
    }
}

/// Rewrite only the `version` field of a manifest file.
///
/// Key order and any fields this crate does not model are kept; the file is
/// written back with four-space indentation.
pub fn rewrite_manifest_version(path: &Path, version: &str) -> Result<()> {
    validate_version(version)?;

    let origin = path.display().to_string();
    let content = io::read_text(path)?;
    let mut doc: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| Error::ManifestParse {
            origin: origin.clone(),
            message: e.to_string(),
        })?;

    let Some(fields) = doc.as_object_mut() else {
        return Err(Error::InvalidManifest {
            origin,
            reason: "top level is not a JSON object".into(),
        });
    };
    fields.insert("version".into(), serde_json::Value::String(version.into()));

    io::write_json_pretty(path, &doc)?;
    tracing::debug!(path = %path.display(), version, "Rewrote manifest version");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_from_url() {
        let repo = Repository::from_url("https://github.com/ICGC-ARGO/demo-wfpkgs.git").unwrap();
        assert_eq!(repo.host, "github.com");
        assert_eq!(repo.account, "icgc-argo");
        assert_eq!(repo.repo, "demo-wfpkgs");
    }

    #[test]
    fn test_repository_from_url_rejects_short_path() {
        let err = Repository::from_url("https://github.com/demo-wfpkgs.git").unwrap_err();
        assert!(matches!(err, Error::InvalidRepositoryUrl { .. }));
    }

    #[test]
    fn test_duplicates_reported() {
        let entries = vec![
            "github.com/a/b/x@1.0.0".to_string(),
            "github.com/a/b/x@1.0.0".to_string(),
        ];
        let err = parse_dependency_list(&entries).unwrap_err();
        assert!(err.starts_with("Duplicated dependencies found"));
    }
}
