//! Installation of released packages into the project's module cache.
//!
//! A dependency `host/account/repo/name@version` is installed to
//! `<root>/<module_dir>/<host>/<account>/<repo>/<name>@<version>`. That
//! directory is both the installation record and the uniqueness key: if it
//! exists, the package is installed.
//!
//! After unpacking, two symlinks let the package's scripts find its own
//! dependencies in the shared cache:
//!
//! - `<target>/<module_dir>` -> `../../../../../<module_dir>`
//! - `<target>/tests/<module_dir>` -> `../<module_dir>` (when `tests/` exists)

use std::fs;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use wfpm_fs::io;
use wfpm_package::PackageUri;
use wfpm_package::release::tarball_urls;

use crate::config::Settings;
use crate::fetch::{ReleaseHost, fetch_first};
use crate::tester::{PackageTester, TestSummary};
use crate::{Error, Result};

/// Result of installing one dependency in a batch.
#[derive(Debug)]
pub struct InstallOutcome {
    pub uri: PackageUri,
    pub result: Result<PathBuf>,
    /// Tests run on the fresh install, if requested and the install succeeded.
    pub tests: Option<Result<TestSummary>>,
}

impl InstallOutcome {
    pub fn is_installed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-package outcomes of [`Installer::install_all`], in plan order.
#[derive(Debug, Default)]
pub struct InstallReport {
    pub outcomes: Vec<InstallOutcome>,
}

impl InstallReport {
    pub fn installed(&self) -> impl Iterator<Item = &InstallOutcome> {
        self.outcomes.iter().filter(|o| o.is_installed())
    }

    pub fn failed(&self) -> impl Iterator<Item = &InstallOutcome> {
        self.outcomes.iter().filter(|o| !o.is_installed())
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    /// Whether every dependency installed.
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Downloads and unpacks release tarballs.
pub struct Installer<'a> {
    host: &'a dyn ReleaseHost,
    project_root: PathBuf,
    module_dir: String,
}

impl<'a> Installer<'a> {
    pub fn new(host: &'a dyn ReleaseHost, project_root: impl Into<PathBuf>, settings: &Settings) -> Self {
        Self {
            host,
            project_root: project_root.into(),
            module_dir: settings.module_dir.clone(),
        }
    }

    /// Where `uri` is (or would be) installed.
    pub fn target_path(&self, uri: &PackageUri) -> PathBuf {
        uri.install_path(&self.project_root, &self.module_dir)
    }

    /// Install one package and return its directory.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyInstalled`] if installed and `force` is false;
    ///   nothing is touched
    /// - [`Error::NotReleased`] if no release tarball exists
    /// - [`Error::InstallationFailure`] if creating, unpacking or linking
    ///   fails; every directory created for the install is removed
    pub fn install(&self, uri: &PackageUri, force: bool) -> Result<PathBuf> {
        let target = self.target_path(uri);

        if target.is_dir() && !force {
            return Err(Error::AlreadyInstalled { path: target });
        }
        if force {
            io::remove_tree(&target)?;
        }

        let Some((url, tarball)) = fetch_first(self.host, &tarball_urls(uri))? else {
            return Err(Error::NotReleased {
                uri: uri.to_string(),
            });
        };

        let created = topmost_missing(&target);
        if let Err(e) = self.unpack(&tarball, &target) {
            if let Err(cleanup) = io::remove_tree(&created) {
                tracing::warn!(path = %created.display(), error = %cleanup, "Failed to remove partial install");
            }
            return Err(Error::InstallationFailure {
                uri: uri.to_string(),
                reason: e.to_string(),
            });
        }

        tracing::info!(package = %uri, url = %url, path = %target.display(), "Installed package");
        Ok(target)
    }

    fn unpack(&self, tarball: &[u8], target: &Path) -> wfpm_fs::Result<()> {
        fs::create_dir_all(target).map_err(|e| wfpm_fs::Error::io(target, e))?;
        let mut archive = tar::Archive::new(GzDecoder::new(tarball));
        archive
            .unpack(target)
            .map_err(|e| wfpm_fs::Error::io(target, e))?;

        let cache_link = target.join(&self.module_dir);
        let cache_target = Path::new("../../../../..").join(&self.module_dir);
        link_unless_present(&cache_target, &cache_link)?;

        let tests_dir = target.join("tests");
        if tests_dir.is_dir() {
            let tests_link = tests_dir.join(&self.module_dir);
            let tests_target = Path::new("..").join(&self.module_dir);
            link_unless_present(&tests_target, &tests_link)?;
        }

        Ok(())
    }

    /// Install every package of `plan` in order.
    ///
    /// A failing package is recorded and the batch moves on. When a tester
    /// is given, each freshly installed package is tested; test failures
    /// are recorded and do not affect later installs.
    pub fn install_all(
        &self,
        plan: &[PackageUri],
        force: bool,
        tester: Option<&dyn PackageTester>,
    ) -> InstallReport {
        let mut report = InstallReport::default();

        for uri in plan {
            let result = self.install(uri, force);
            if let Err(e) = &result {
                tracing::warn!(package = %uri, error = %e, "Installation failed");
            }

            let tests = match (&result, tester) {
                (Ok(path), Some(tester)) => Some(tester.test_package(path)),
                _ => None,
            };

            report.outcomes.push(InstallOutcome {
                uri: uri.clone(),
                result,
                tests,
            });
        }

        report
    }
}

/// The outermost directory that creating `path` would add.
fn topmost_missing(path: &Path) -> PathBuf {
    let mut missing = path.to_path_buf();
    for ancestor in path.ancestors().skip(1) {
        if ancestor.exists() {
            break;
        }
        missing = ancestor.to_path_buf();
    }
    missing
}

fn link_unless_present(target: &Path, link: &Path) -> wfpm_fs::Result<()> {
    if fs::symlink_metadata(link).is_ok() {
        tracing::debug!(link = %link.display(), "Link path already present, leaving it");
        return Ok(());
    }
    io::symlink_dir(target, link)
}
