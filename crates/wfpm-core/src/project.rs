//! A package project: the directory tree below a `.wfpm` marker.
//!
//! A [`Project`] is a snapshot. It reads the configuration, every local and
//! installed manifest and the git state once, when loaded. Operations that
//! change branches call [`Project::reload`] to observe their effect.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use wfpm_fs::{WfpmPath, find_upwards};
use wfpm_git::parse::parse_package_branch;
use wfpm_git::{GitClient, GitLedger, GitStateTracker};
use wfpm_package::Manifest;

use crate::config::{ProjectConfig, Settings};
use crate::resolver::{DependencyResolver, ManifestSource};
use crate::{Error, Result};

pub struct Project {
    root: PathBuf,
    cwd: PathBuf,
    config: ProjectConfig,
    settings: Settings,
    client: Arc<dyn GitClient>,
    git: GitStateTracker,
    ledger: GitLedger,
    packages: Vec<Manifest>,
    installed: Vec<Manifest>,
    pkg_workon: Option<String>,
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("root", &self.root)
            .field("cwd", &self.cwd)
            .field("config", &self.config)
            .field("pkg_workon", &self.pkg_workon)
            .finish_non_exhaustive()
    }
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

impl Project {
    /// Find the project root containing `cwd`.
    pub fn locate(cwd: &Path) -> Result<PathBuf> {
        find_upwards(&canonical(cwd), WfpmPath::ProjectMarker).ok_or(Error::NotInProject)
    }

    /// Load the project containing `cwd`.
    pub fn discover(cwd: &Path, settings: Settings, client: Arc<dyn GitClient>) -> Result<Self> {
        let root = Self::locate(cwd)?;
        Self::load(&root, cwd, settings, client)
    }

    /// Load the project rooted at `root`, as seen from `cwd`.
    pub fn load(
        root: &Path,
        cwd: &Path,
        settings: Settings,
        client: Arc<dyn GitClient>,
    ) -> Result<Self> {
        let root = canonical(root);
        let cwd = canonical(cwd);

        let marker = root.join(WfpmPath::ProjectMarker);
        if !marker.is_file() {
            return Err(Error::InvalidProjectConfig {
                path: marker,
                reason: "file not found".into(),
            });
        }
        let config = ProjectConfig::load(&marker)?;

        let git = GitStateTracker::new(Arc::clone(&client), settings.main_branch.clone());
        let ledger = git.ledger();

        let mut packages = load_manifests(&root, &["*"])?;
        packages.sort_by(|a, b| a.name().cmp(b.name()));

        let module_dir = settings.module_dir.clone();
        let mut installed = load_manifests(&root, &[module_dir.as_str(), "*", "*", "*", "*"])?;
        installed.sort_by(|a, b| a.uri().cmp(b.uri()));

        let pkg_workon = git
            .current_branch()
            .and_then(parse_package_branch)
            .filter(|(name, version)| ledger.is_candidate(name, version))
            .map(|(name, version)| format!("{name}@{version}"));

        tracing::debug!(
            root = %root.display(),
            packages = packages.len(),
            installed = installed.len(),
            workon = ?pkg_workon,
            git = ?git.version(),
            "Loaded project"
        );

        Ok(Self {
            root,
            cwd,
            config,
            settings,
            client,
            git,
            ledger,
            packages,
            installed,
            pkg_workon,
        })
    }

    /// Load a fresh snapshot of the same project.
    pub fn reload(&self) -> Result<Self> {
        Self::load(
            &self.root,
            &self.cwd,
            self.settings.clone(),
            Arc::clone(&self.client),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn git(&self) -> &GitStateTracker {
        &self.git
    }

    pub fn ledger(&self) -> &GitLedger {
        &self.ledger
    }

    /// `repo_server/repo_account/project_name`
    pub fn fullname(&self) -> String {
        self.config.fullname()
    }

    /// Local packages, `<root>/*/pkg.json`, sorted by name.
    pub fn packages(&self) -> &[Manifest] {
        &self.packages
    }

    /// Installed dependencies below the module cache, sorted by URI.
    pub fn installed_packages(&self) -> &[Manifest] {
        &self.installed
    }

    /// Local package by name.
    pub fn package(&self, name: &str) -> Option<&Manifest> {
        self.packages.iter().find(|m| m.name() == name)
    }

    /// `name@version` of the package being worked on: the current branch,
    /// when it is an unreleased package branch.
    pub fn pkg_workon(&self) -> Option<&str> {
        self.pkg_workon.as_deref()
    }

    /// Local manifest of the package being worked on.
    pub fn current_package(&self) -> Option<&Manifest> {
        let (name, _) = self.pkg_workon.as_deref()?.split_once('@')?;
        self.package(name)
    }

    /// Local package whose directory contains the working directory.
    pub fn package_at_cwd(&self) -> Option<&Manifest> {
        self.packages
            .iter()
            .find(|m| m.dir().is_some_and(|dir| self.cwd.starts_with(dir)))
    }

    /// Every unreleased package version as `name@version`.
    pub fn pkgs_in_dev(&self) -> Vec<String> {
        self.ledger.candidate_fullnames()
    }

    /// Every released package version as `name@version`.
    pub fn pkgs_released(&self) -> Vec<String> {
        self.ledger.released_fullnames()
    }

    pub fn is_at_root(&self) -> bool {
        self.cwd == self.root
    }

    /// Fail unless the working directory is the project root.
    pub fn require_root(&self) -> Result<()> {
        if self.is_at_root() {
            Ok(())
        } else {
            Err(Error::NotAtProjectRoot {
                root: self.root.clone(),
            })
        }
    }

    /// A resolver that reads dependencies found in this project from their
    /// local manifests and fetches the rest from `remote`.
    pub fn dependency_resolver<'a>(&self, remote: &'a dyn ManifestSource) -> DependencyResolver<'a> {
        DependencyResolver::new(remote).with_local_manifests(self.packages.iter().cloned())
    }
}

fn load_manifests(root: &Path, dirs: &[&str]) -> Result<Vec<Manifest>> {
    let mut pattern = glob::Pattern::escape(&root.to_string_lossy());
    for dir in dirs {
        pattern.push('/');
        pattern.push_str(dir);
    }
    pattern.push('/');
    pattern.push_str(WfpmPath::PackageManifest.as_str());

    let paths = glob::glob(&pattern)
        .map_err(|e| Error::precondition(format!("Invalid manifest pattern '{pattern}': {e}")))?;

    let mut manifests = Vec::new();
    for path in paths.filter_map(|entry| entry.ok()) {
        let manifest = Manifest::from_path(&path)
            .map_err(|source| Error::InvalidPackageJson { path, source })?;
        manifests.push(manifest);
    }
    Ok(manifests)
}
