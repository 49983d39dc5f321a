//! Running a package's test jobs

use std::path::{Path, PathBuf};
use std::process::Command;

use wfpm_fs::WfpmPath;

use crate::{Error, Result};

/// Outcome of one test job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestJob {
    pub job: PathBuf,
    pub passed: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Outcome of all test jobs of one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSummary {
    pub package_dir: PathBuf,
    pub jobs: Vec<TestJob>,
}

impl TestSummary {
    pub fn passed(&self) -> usize {
        self.jobs.iter().filter(|j| j.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.jobs.len() - self.passed()
    }

    /// Package directory name, e.g. `fastqc` or `fastqc@0.2.0`.
    pub fn package_name(&self) -> String {
        self.package_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Runs the tests of a package directory.
pub trait PackageTester {
    fn test_package(&self, package_dir: &Path) -> Result<TestSummary>;
}

/// Runs every `tests/test-*.json` job through `tests/checker.nf`:
/// `cd tests && ./checker.nf -params-file <job>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NextflowTester;

impl NextflowTester {
    pub fn new() -> Self {
        Self
    }

    /// Test job files of a package, sorted.
    pub fn job_files(package_dir: &Path) -> Result<Vec<PathBuf>> {
        let tests_dir = package_dir.join(WfpmPath::TestsDir);
        let pattern = format!(
            "{}/test-*.json",
            glob::Pattern::escape(&tests_dir.to_string_lossy())
        );

        let paths = glob::glob(&pattern).map_err(|e| {
            Error::precondition(format!("Invalid test job pattern '{pattern}': {e}"))
        })?;

        let mut jobs: Vec<PathBuf> = paths.filter_map(|entry| entry.ok()).collect();
        jobs.sort();
        Ok(jobs)
    }
}

impl PackageTester for NextflowTester {
    fn test_package(&self, package_dir: &Path) -> Result<TestSummary> {
        let tests_dir = package_dir.join(WfpmPath::TestsDir);
        let checker = tests_dir.join(WfpmPath::CheckerScript);
        let mut jobs = Vec::new();

        for job in Self::job_files(package_dir)? {
            tracing::debug!(job = %job.display(), "Running test job");

            let output = Command::new(&checker)
                .current_dir(&tests_dir)
                .arg("-params-file")
                .arg(&job)
                .output();

            let result = match output {
                Ok(out) => TestJob {
                    job,
                    passed: out.status.success(),
                    stdout: String::from_utf8_lossy(&out.stdout).trim().to_string(),
                    stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
                },
                Err(e) => TestJob {
                    job,
                    passed: false,
                    stdout: String::new(),
                    stderr: format!("failed to run {}: {e}", checker.display()),
                },
            };
            jobs.push(result);
        }

        let summary = TestSummary {
            package_dir: package_dir.to_path_buf(),
            jobs,
        };
        tracing::info!(
            package = %summary.package_name(),
            passed = summary.passed(),
            failed = summary.failed(),
            "Tested package"
        );
        Ok(summary)
    }
}
