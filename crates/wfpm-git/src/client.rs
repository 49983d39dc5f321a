//! The git command-line client as a capability

use std::path::PathBuf;
use std::process::Command;

use crate::Result;

/// Captured result of one git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs git commands and returns their textual output.
///
/// Implementations must not interpret the output; parsing belongs to
/// [`crate::parse`]. An `Err` means git could not be started at all, a
/// non-zero `code` means it ran and failed.
pub trait GitClient: Send + Sync {
    fn run(&self, args: &[&str]) -> Result<CommandOutput>;
}

/// [`GitClient`] backed by the `git` binary on `PATH`.
#[derive(Debug, Clone)]
pub struct SystemGit {
    workdir: PathBuf,
}

impl SystemGit {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }
}

impl GitClient for SystemGit {
    fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        tracing::debug!(args = ?args, workdir = %self.workdir.display(), "Running git");

        let output = Command::new("git")
            .current_dir(&self.workdir)
            .args(args)
            .output()?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            code: output.status.code().unwrap_or(-1),
        })
    }
}
