//! [`TestProject`] builder for package project scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use wfpm_core::{Project, Settings};
use wfpm_git::GitClient;

pub const SERVER: &str = "github.com";
pub const ACCOUNT: &str = "icgc-argo";
pub const PROJECT: &str = "demo-wfpkgs";

/// A temporary package project with a `.wfpm` marker.
///
/// # Example
///
/// ```rust
/// use wfpm_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project.add_package("fastqc", "0.2.0", &[]);
/// assert!(project.root().join("fastqc/pkg.json").is_file());
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    pub fn new() -> Self {
        let project = Self {
            temp_dir: TempDir::new().unwrap(),
        };
        project.write(
            ".wfpm",
            &format!(
                "project_name: {PROJECT}\nrepo_type: git\nrepo_server: {SERVER}\nrepo_account: {ACCOUNT}\nlicense: MIT\n"
            ),
        );
        project
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// URI of a package in this project.
    pub fn uri(name: &str, version: &str) -> String {
        format!("{SERVER}/{ACCOUNT}/{PROJECT}/{name}@{version}")
    }

    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root().join(rel)).unwrap()
    }

    /// Add a local package with a manifest, a main script and a checker.
    pub fn add_package(&self, name: &str, version: &str, dependencies: &[&str]) -> PathBuf {
        self.add_package_with(name, version, dependencies, &[])
    }

    pub fn add_package_with(
        &self,
        name: &str,
        version: &str,
        dependencies: &[&str],
        dev_dependencies: &[&str],
    ) -> PathBuf {
        let manifest = serde_json::json!({
            "name": name,
            "version": version,
            "description": format!("{name} package"),
            "main": "main",
            "repository": {
                "type": "git",
                "url": format!("https://{SERVER}/{ACCOUNT}/{PROJECT}.git"),
            },
            "dependencies": dependencies,
            "devDependencies": dev_dependencies,
        });
        self.write(
            &format!("{name}/pkg.json"),
            &serde_json::to_string_pretty(&manifest).unwrap(),
        );
        self.write(
            &format!("{name}/main.nf"),
            &format!("#!/usr/bin/env nextflow\n\nnextflow.enable.dsl = 2\nversion = '{version}'\n"),
        );
        self.write(
            &format!("{name}/tests/checker.nf"),
            &format!("#!/usr/bin/env nextflow\n\nversion = '{version}'  // package version\n"),
        );
        self.root().join(name)
    }

    /// Write the manifest of an installed dependency into the module cache.
    pub fn add_installed(&self, uri: &str) -> PathBuf {
        let uri = wfpm_package::PackageUri::parse(uri).unwrap();
        let dir = uri.install_path(self.root(), &Settings::default().module_dir);
        let rel = dir.strip_prefix(self.root()).unwrap().join("pkg.json");
        self.write(
            &rel.to_string_lossy(),
            &crate::host::release_manifest(&uri, &[]),
        );
        dir
    }

    /// Load the project as seen from `cwd`, relative to the root.
    pub fn load(&self, cwd: &str, git: Arc<dyn GitClient>) -> wfpm_core::Result<Project> {
        Project::discover(&self.root().join(cwd), Settings::default(), git)
    }
}
