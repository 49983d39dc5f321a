//! `wfpm nextver`

use std::path::Path;

use colored::Colorize;
use wfpm_core::{Settings, VersionLifecycle};

use crate::context::load_project;
use crate::error::Result;

pub fn run_nextver(cwd: &Path, settings: Settings, pkg: &str, version: &str) -> Result<()> {
    let project = load_project(cwd, settings)?;
    let mut lifecycle = VersionLifecycle::new(project);

    let outcome = lifecycle.nextver(pkg, version)?;
    println!("{}", outcome.to_string().green());
    Ok(())
}
