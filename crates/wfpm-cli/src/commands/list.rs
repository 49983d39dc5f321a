//! `wfpm list`

use std::path::Path;

use wfpm_core::Settings;

use crate::context::load_project;
use crate::error::Result;

/// Print local packages and installed dependencies as `TYPE\tPKG_URI` rows.
pub fn run_list(cwd: &Path, settings: Settings) -> Result<()> {
    let project = load_project(cwd, settings)?;

    let mut local: Vec<String> = project.packages().iter().map(|m| m.uri().to_string()).collect();
    local.sort();
    let mut deps: Vec<String> = project
        .installed_packages()
        .iter()
        .map(|m| m.uri().to_string())
        .collect();
    deps.sort();

    println!("TYPE\tPKG_URI");
    for uri in local {
        println!("local\t{uri}");
    }
    for uri in deps {
        println!("dep\t{uri}");
    }
    Ok(())
}
