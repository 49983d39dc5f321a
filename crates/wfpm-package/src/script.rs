//! The `version = '...'` marker inside a package's workflow scripts

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use wfpm_fs::io;

use crate::Result;

static VERSION_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*version\s*=\s*["'](.+)["']\s*.*$"#).unwrap());

/// File name of a package's main script; `.nf` is appended when missing.
pub fn main_script_name(main: &str) -> String {
    if main.ends_with(".nf") {
        main.to_string()
    } else {
        format!("{main}.nf")
    }
}

/// Value of the first `version = '...'` line, if any.
pub fn extract_version(script: &str) -> Option<String> {
    script
        .lines()
        .find_map(|line| VERSION_LINE_RE.captures(line))
        .map(|caps| caps[1].to_string())
}

/// Replace the first line whose trimmed text starts with `version` by
/// `version = '<version>'`. Every other line is kept as is.
pub fn rewrite_version(script: &str, version: &str) -> String {
    let mut out = String::with_capacity(script.len());
    let mut found = false;

    for line in script.split_inclusive('\n') {
        if !found && line.trim().starts_with("version") {
            out.push_str(&format!("version = '{version}'\n"));
            found = true;
        } else {
            out.push_str(line);
        }
    }

    out
}

/// Rewrite the version marker of a script file in place.
pub fn rewrite_script_version(path: &Path, version: &str) -> Result<()> {
    let content = io::read_text(path)?;
    let previous = extract_version(&content);
    io::write_text(path, &rewrite_version(&content, version))?;
    tracing::debug!(path = %path.display(), from = ?previous, version, "Rewrote script version");
    Ok(())
}
