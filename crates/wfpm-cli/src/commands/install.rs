//! `wfpm install`

use std::path::Path;

use colored::Colorize;
use wfpm_core::{
    HttpReleaseHost, Installer, NextflowTester, PackageTester, RemoteManifestSource, Settings,
};

use super::test::print_summary;
use crate::context::load_project;
use crate::error::{CliError, Result};

/// Install the dependencies of the package in `cwd`.
pub fn run_install(cwd: &Path, settings: Settings, force: bool, skip_tests: bool) -> Result<()> {
    let project = load_project(cwd, settings)?;

    if project.cwd().parent() != Some(project.root()) {
        return Err(CliError::user("Not in a package directory."));
    }
    let Some(manifest) = project.package_at_cwd() else {
        return Err(CliError::user(
            "Not in a package directory, 'pkg.json' not found in the current directory.",
        ));
    };

    let host = HttpReleaseHost::new(project.settings())?;
    let source = RemoteManifestSource::new(&host);
    let plan = project
        .dependency_resolver(&source)
        .build(manifest)
        .and_then(|graph| graph.install_plan())
        .map_err(|e| CliError::user(format!("Unable to build package dependency graph: {e}")))?;

    if plan.is_empty() {
        println!("No dependencies to install.");
        return Ok(());
    }

    let tester = NextflowTester::new();
    let tester = (!skip_tests).then_some(&tester as &dyn PackageTester);
    let installer = Installer::new(&host, project.root(), project.settings());
    let report = installer.install_all(&plan, force, tester);

    let mut failed_tests = 0;
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(path) => {
                let shown = path.strip_prefix(project.cwd()).unwrap_or(path);
                println!("Package installed in: {}", shown.display().to_string().green());
            }
            Err(e) => println!("{} {e}", "Warning:".yellow().bold()),
        }
        match &outcome.tests {
            Some(Ok(summary)) => failed_tests += print_summary(summary),
            Some(Err(e)) => {
                failed_tests += 1;
                println!("{} {e}", "Warning:".yellow().bold());
            }
            None => {}
        }
    }

    if !report.is_success() {
        return Err(CliError::user(format!(
            "{} of {} dependencies failed to install.",
            report.failed_count(),
            report.outcomes.len()
        )));
    }
    if failed_tests > 0 {
        return Err(CliError::user(format!(
            "{failed_tests} test(s) failed on installed dependencies."
        )));
    }
    Ok(())
}
