//! `wfpm workon`

use std::path::Path;

use colored::Colorize;
use wfpm_core::{Settings, VersionLifecycle, WorkonOutcome};

use crate::context::load_project;
use crate::error::Result;

pub fn run_workon(
    cwd: &Path,
    settings: Settings,
    pkg: Option<&str>,
    stop: bool,
    update: bool,
) -> Result<()> {
    let project = load_project(cwd, settings)?;
    let mut lifecycle = VersionLifecycle::new(project);

    let outcome = lifecycle.workon(pkg, stop, update)?;
    match &outcome {
        WorkonOutcome::Switched { .. } | WorkonOutcome::Stopped { .. } => {
            println!("{}", outcome.to_string().green())
        }
        _ => println!("{outcome}"),
    }
    Ok(())
}
