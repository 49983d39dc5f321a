//! Package version lifecycle: `workon` and `nextver`.
//!
//! Every package version lives on a `name@version` branch until it is
//! released by a `name.vVERSION` tag. The package being worked on is the
//! one whose branch is checked out. States:
//!
//! - [`FocusState::Idle`]: on the main branch
//! - [`FocusState::InDevelopment`]: on an unreleased package branch
//! - [`FocusState::Released`]: on a package branch that was released since;
//!   the branch must be left and deleted before anything else
//! - [`FocusState::Elsewhere`]: any other branch, or no branch at all
//!
//! Transitions check out branches through git and then reload the
//! [`Project`], so the returned state always reflects the repository.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use wfpm_fs::WfpmPath;
use wfpm_git::SyncStatus;
use wfpm_git::parse::parse_package_branch;
use wfpm_package::naming::{PKG_VERSION_PATTERN, is_valid_version, split_fullname};
use wfpm_package::script::{main_script_name, rewrite_script_version};
use wfpm_package::{LooseVersion, Manifest, rewrite_manifest_version};

use crate::project::Project;
use crate::{Error, Result};

/// Where the repository's checked-out branch puts the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusState {
    Idle,
    InDevelopment { name: String, version: String },
    Released { name: String, version: String },
    Elsewhere { branch: Option<String> },
}

impl FocusState {
    pub fn of(project: &Project) -> Self {
        let git = project.git();
        let Some(branch) = git.current_branch() else {
            return Self::Elsewhere { branch: None };
        };
        if branch == git.main_branch() {
            return Self::Idle;
        }

        match parse_package_branch(branch) {
            Some((name, version)) if project.ledger().is_released(&name, &version) => {
                Self::Released { name, version }
            }
            Some((name, version)) if project.ledger().is_candidate(&name, &version) => {
                Self::InDevelopment { name, version }
            }
            _ => Self::Elsewhere {
                branch: Some(branch.to_string()),
            },
        }
    }
}

/// Released versions, versions in development and the current focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkonReport {
    pub releases: BTreeMap<String, Vec<String>>,
    pub in_development: BTreeMap<String, Vec<String>>,
    pub workon: Option<String>,
}

impl WorkonReport {
    pub fn of(project: &Project) -> Self {
        Self {
            releases: project.ledger().releases().clone(),
            in_development: project.ledger().release_candidates().clone(),
            workon: project.pkg_workon().map(String::from),
        }
    }
}

impl fmt::Display for WorkonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (title, section) in [
            ("Packages released:", &self.releases),
            ("Packages in development:", &self.in_development),
        ] {
            if section.is_empty() {
                writeln!(f, "{title} <none>")?;
            } else {
                writeln!(f, "{title}")?;
                for (name, versions) in section {
                    writeln!(f, "  {name}: {}", versions.join(", "))?;
                }
            }
        }
        write!(
            f,
            "Package being worked on: {}",
            self.workon.as_deref().unwrap_or("<none>")
        )
    }
}

/// What a `workon` invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkonOutcome {
    Report(WorkonReport),
    Unchanged { package: String },
    Switched { package: String },
    NotInDevelopment { package: String },
    Stopped { package: String },
    NotWorkingOnAny,
}

impl fmt::Display for WorkonOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Report(report) => write!(f, "{report}"),
            Self::Unchanged { package } => {
                write!(f, "Continue working on '{package}', no change.")
            }
            Self::Switched { package } => write!(f, "Now work on '{package}'"),
            Self::NotInDevelopment { package } => {
                write!(f, "Not a package in development: '{package}'")
            }
            Self::Stopped { package } => write!(f, "Stopped work on {package}"),
            Self::NotWorkingOnAny => write!(f, "Not working on any package."),
        }
    }
}

/// Where a new version was branched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartedFrom {
    InDevelopment,
    Released,
}

impl fmt::Display for StartedFrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InDevelopment => "in development",
            Self::Released => "released",
        })
    }
}

/// A new package version created by `nextver`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextverOutcome {
    pub package: String,
    pub from: String,
    pub started_from: StartedFrom,
}

impl fmt::Display for NextverOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Started a new package version: {}\n\
             Code updated with new version number, added and committed to git. \
             Please continue working on it.",
            self.package
        )
    }
}

/// Drives `workon` / `nextver` transitions over a [`Project`].
#[derive(Debug)]
pub struct VersionLifecycle {
    project: Project,
}

impl VersionLifecycle {
    pub fn new(project: Project) -> Self {
        Self { project }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn into_project(self) -> Project {
        self.project
    }

    pub fn state(&self) -> FocusState {
        FocusState::of(&self.project)
    }

    pub fn report(&self) -> WorkonReport {
        WorkonReport::of(&self.project)
    }

    /// `wfpm workon [PKG] [-s] [-u]`.
    ///
    /// - no package: report released and in-development versions
    /// - `pkg` as `name@version` or a bare `name` with a single version in
    ///   development: switch to its branch
    /// - `stop`: return to the main branch
    /// - `update`: first fetch from the remote and prune gone branches;
    ///   only allowed on the main branch
    pub fn workon(&mut self, pkg: Option<&str>, stop: bool, update: bool) -> Result<WorkonOutcome> {
        if update {
            let git = self.project.git();
            if !git.on_main_branch() {
                return Err(Error::precondition(format!(
                    "Can only use '-u' when on the '{}' branch, currently on '{}'",
                    git.main_branch(),
                    git.current_branch().unwrap_or("<none>")
                )));
            }
            git.fetch_and_housekeeping()?;
            self.project = self.project.reload()?;
        }

        if let FocusState::Released { name, version } = self.state() {
            let branch = format!("{name}@{version}");
            return Err(Error::precondition(format!(
                "You are on a package branch that has been released '{branch}'.\n\
                 Please switch to the '{main}' branch, run 'git branch -D {branch}' to delete the \
                 local branch. Make sure to delete it on GitHub as well.",
                main = self.project.git().main_branch()
            )));
        }

        match (pkg, stop) {
            (Some(_), true) => Err(Error::precondition(
                "When '-s' is used, no pkg argument can be supplied.",
            )),
            (None, false) => Ok(WorkonOutcome::Report(self.report())),
            (None, true) => self.stop(),
            (Some(pkg), false) => self.switch_to(pkg),
        }
    }

    fn switch_to(&mut self, pkg: &str) -> Result<WorkonOutcome> {
        if let Some(current) = self.project.pkg_workon() {
            let current_name = current.split_once('@').map_or(current, |(n, _)| n);
            if pkg == current || pkg == current_name {
                return Ok(WorkonOutcome::Unchanged {
                    package: current.to_string(),
                });
            }
        }

        let target = if let Some((name, version)) = split_fullname(pkg) {
            if !self.project.ledger().is_candidate(name, version) {
                return Ok(WorkonOutcome::NotInDevelopment {
                    package: pkg.to_string(),
                });
            }
            pkg.to_string()
        } else {
            match self.project.ledger().candidates_of(pkg) {
                [] => {
                    return Ok(WorkonOutcome::NotInDevelopment {
                        package: pkg.to_string(),
                    });
                }
                [only] => format!("{pkg}@{only}"),
                versions => {
                    return Err(Error::precondition(format!(
                        "Multiple versions of the package are in development: {}\n\
                         Please specify which version to work on, eg, \
                         'wfpm workon {pkg}@{}' or 'wfpm workon {pkg}@{}'",
                        versions.join(", "),
                        versions[0],
                        versions[1]
                    )));
                }
            }
        };

        self.project.require_root()?;
        self.checkout(&target)?;
        Ok(WorkonOutcome::Switched { package: target })
    }

    fn stop(&mut self) -> Result<WorkonOutcome> {
        let Some(current) = self.project.pkg_workon().map(String::from) else {
            return Ok(WorkonOutcome::NotWorkingOnAny);
        };

        self.project.require_root()?;
        if !self.project.git().is_clean()? {
            return Err(Error::precondition(format!(
                "Package branch '{current}' not clean, please complete on-going work and commit changes."
            )));
        }

        let main = self.project.git().main_branch().to_string();
        self.checkout(&main)?;
        Ok(WorkonOutcome::Stopped { package: current })
    }

    /// Check out `branch`, clearing untracked files from the module cache and
    /// from the package being left, then reload the project.
    fn checkout(&mut self, branch: &str) -> Result<()> {
        let module_dir = self.project.settings().module_dir.clone();
        let mut cleanup = vec![module_dir.as_str()];
        let leaving = self
            .project
            .git()
            .current_branch()
            .and_then(parse_package_branch)
            .map(|(name, _)| name);
        if let Some(name) = leaving.as_deref() {
            cleanup.push(name);
        }

        self.project.git().checkout_branch(branch, &cleanup)?;
        self.project = self.project.reload()?;
        Ok(())
    }

    /// `wfpm nextver PKG NEW_VERSION`: start `name@NEW_VERSION` from the
    /// in-development or released `pkg`.
    pub fn nextver(&mut self, pkg: &str, new_version: &str) -> Result<NextverOutcome> {
        let (name, version) = self.validate_nextver(pkg, new_version)?;

        self.project.git().fetch_and_housekeeping().map_err(|e| {
            Error::precondition(format!("Unable to fetch branches/tags from remote. {e}"))
        })?;
        self.project = self.project.reload()?;
        self.ensure_synced(self.project.git().main_branch())?;

        let new_pkg = format!("{name}@{new_version}");
        let ledger = self.project.ledger();
        if ledger.is_candidate(&name, new_version) || ledger.is_released(&name, new_version) {
            return Err(Error::precondition(format!(
                "Specified new version already exists: {new_pkg}"
            )));
        }

        let started_from = if ledger.is_candidate(&name, &version) {
            self.project.git().checkout_branch(pkg, &[])?;
            self.ensure_synced(pkg)?;
            self.project.git().new_branch(&new_pkg)?;
            StartedFrom::InDevelopment
        } else if ledger.is_released(&name, &version) {
            let git = self.project.git();
            let uri_tag = format!("{name}.v{version}");
            let tag = if git.has_tag(&uri_tag) {
                uri_tag
            } else {
                format!("{name}.{version}")
            };
            git.new_branch_from_tag(&tag, &new_pkg)?;
            StartedFrom::Released
        } else {
            return Err(Error::precondition(format!(
                "No package found as: '{pkg}'. Run 'wfpm workon' to display package info."
            )));
        };

        self.project = self.project.reload()?;
        let package_dir = self.project.root().join(&name);
        bump_package_files(&package_dir, new_version)?;

        let message = format!(
            "[wfpm v{}] started a new version {new_pkg} from {pkg} which was {started_from}",
            env!("CARGO_PKG_VERSION")
        );
        self.project.git().add_and_commit(&name, &message)?;
        self.project = self.project.reload()?;

        tracing::info!(package = %new_pkg, from = %pkg, "Started new package version");
        Ok(NextverOutcome {
            package: new_pkg,
            from: pkg.to_string(),
            started_from,
        })
    }

    fn validate_nextver(&self, pkg: &str, new_version: &str) -> Result<(String, String)> {
        let Some((name, version)) = split_fullname(pkg) else {
            return Err(Error::precondition(
                "Please specify package full name, ie, <pkg_name>@<version>",
            ));
        };
        if !is_valid_version(new_version) {
            return Err(Error::precondition(format!(
                "Specified new version is not valid, expected pattern: {PKG_VERSION_PATTERN}"
            )));
        }
        if LooseVersion::new(new_version) <= LooseVersion::new(version) {
            return Err(Error::precondition(format!(
                "New version '{new_version}' must be higher than the starting version '{version}'"
            )));
        }

        self.project.require_root()?;

        let git = self.project.git();
        if !git.is_available() {
            return Err(wfpm_git::Error::Unavailable.into());
        }
        if !git.has_user_identity() {
            return Err(Error::precondition(
                "Git not configured with 'user.name' and 'user.email', please set them using 'git config'.",
            ));
        }
        if let Some(current) = self.project.pkg_workon() {
            return Err(Error::precondition(format!(
                "Must stop working on '{current}' before creating a new package version. \
                 Please run: wfpm workon -s"
            )));
        }
        if !git.on_main_branch() {
            return Err(Error::precondition(format!(
                "Must run this command on {} branch, current branch: {}",
                git.main_branch(),
                git.current_branch().unwrap_or("<none>")
            )));
        }
        let branch = git.main_branch();
        if !git.is_clean()? {
            return Err(Error::precondition(format!(
                "Git branch '{branch}' not clean. Please complete current work and commit changes."
            )));
        }

        Ok((name.to_string(), version.to_string()))
    }

    fn ensure_synced(&self, branch: &str) -> Result<()> {
        let status = self.project.git().status()?;
        let message = match status {
            SyncStatus::Behind => format!(
                "Local '{branch}' branch is behind the remote. Please 'git pull' to update."
            ),
            SyncStatus::Ahead => format!(
                "Local '{branch}' branch is ahead of remote. Please 'git push' to publish local changes."
            ),
            SyncStatus::Diverged => format!(
                "Local '{branch}' branch has diverged from remote. \
                 Please resolve the changes and synchronize."
            ),
            SyncStatus::UpToDate | SyncStatus::Clean | SyncStatus::Unknown => return Ok(()),
        };
        Err(Error::precondition(message))
    }
}

/// Write `version` into a package's manifest, main script and checker script.
fn bump_package_files(package_dir: &Path, version: &str) -> Result<()> {
    let manifest_path = package_dir.join(WfpmPath::PackageManifest);
    rewrite_manifest_version(&manifest_path, version)?;
    let manifest = Manifest::from_path(&manifest_path)?;

    let main_script = package_dir.join(main_script_name(manifest.main()));
    let checker = package_dir
        .join(WfpmPath::TestsDir)
        .join(WfpmPath::CheckerScript);

    for script in [main_script, checker] {
        if script.is_file() {
            rewrite_script_version(&script, version)?;
        } else {
            tracing::warn!(script = %script.display(), "Script not found, version not updated");
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    fn versions(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(name, vs)| (name.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_report_lists_each_section() {
        let report = WorkonReport {
            releases: versions(&[("bar", &["0.2.0"]), ("foo", &["1.1.0", "1.0.0"])]),
            in_development: BTreeMap::new(),
            workon: None,
        };

        insta::assert_snapshot!(report.to_string(), @r"
        Packages released:
          bar: 0.2.0
          foo: 1.1.0, 1.0.0
        Packages in development: <none>
        Package being worked on: <none>
        ");
    }

    #[test]
    fn test_report_shows_focus() {
        let report = WorkonReport {
            releases: BTreeMap::new(),
            in_development: versions(&[("foo", &["1.2.0"])]),
            workon: Some("foo@1.2.0".into()),
        };

        assert_eq!(
            report.to_string(),
            "Packages released: <none>\n\
             Packages in development:\n  foo: 1.2.0\n\
             Package being worked on: foo@1.2.0"
        );
    }

    #[test]
    fn test_outcome_messages() {
        let package = "foo@1.2.0".to_string();
        assert_eq!(
            WorkonOutcome::Unchanged { package: package.clone() }.to_string(),
            "Continue working on 'foo@1.2.0', no change."
        );
        assert_eq!(
            WorkonOutcome::Switched { package: package.clone() }.to_string(),
            "Now work on 'foo@1.2.0'"
        );
        assert_eq!(
            WorkonOutcome::Stopped { package }.to_string(),
            "Stopped work on foo@1.2.0"
        );
        assert_eq!(
            WorkonOutcome::NotWorkingOnAny.to_string(),
            "Not working on any package."
        );
    }

    #[test]
    fn test_nextver_outcome_message() {
        let outcome = NextverOutcome {
            package: "foo@1.1.0".into(),
            from: "foo@1.0.0".into(),
            started_from: StartedFrom::Released,
        };
        assert!(outcome.to_string().starts_with("Started a new package version: foo@1.1.0\n"));
        assert_eq!(StartedFrom::InDevelopment.to_string(), "in development");
    }
}
