//! Project context for one invocation

use std::path::Path;
use std::sync::Arc;

use wfpm_core::{Project, Settings};
use wfpm_git::SystemGit;

use crate::error::Result;

/// Load the project containing `cwd`, talking to the system `git`.
pub fn load_project(cwd: &Path, settings: Settings) -> Result<Project> {
    let root = Project::locate(cwd)?;
    let git = Arc::new(SystemGit::new(&root));
    Ok(Project::load(&root, cwd, settings, git)?)
}
