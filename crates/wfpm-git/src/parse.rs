//! Parsers for git command output.
//!
//! Every piece of knowledge about git's textual output lives here. The
//! tracker only runs commands and hands their stdout to these functions.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use wfpm_package::naming::{is_valid_name, is_valid_version, split_fullname};

static GIT_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(([0-9]+)\.[0-9]+\.[0-9]+)").unwrap());

const REMOTE_PREFIX: &str = "remotes/origin/";

/// Version reported by `git --version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitVersion {
    pub major: u32,
    pub raw: String,
}

/// Parse `git --version` output, e.g. `git version 2.39.2 (Apple Git-143)`.
pub fn parse_version(stdout: &str) -> Option<GitVersion> {
    let caps = GIT_VERSION_RE.captures(stdout)?;
    let major = caps[2].parse().ok()?;
    Some(GitVersion {
        major,
        raw: caps[1].to_string(),
    })
}

/// `user.name` / `user.email` from `git config --list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserConfig {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Parse `git config --list`. Later entries win, matching git's own
/// precedence of local over global settings.
pub fn parse_user_config(stdout: &str) -> UserConfig {
    let mut config = UserConfig::default();

    for line in stdout.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim() {
            "user.name" => config.name = Some(value.to_string()),
            "user.email" => config.email = Some(value.to_string()),
            _ => {}
        }
    }

    config
}

/// Branches listed by `git branch -a`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Branches {
    pub current: Option<String>,
    pub local: Vec<String>,
    pub remote: Vec<String>,
}

/// Parse `git branch -a`.
///
/// ```text
/// * main
///   fastqc@0.2.0
///   remotes/origin/HEAD -> origin/main
///   remotes/origin/fastqc@0.2.0
/// ```
///
/// Remote branches are only taken from `origin`. A detached HEAD leaves
/// `current` unset.
pub fn parse_branches(stdout: &str) -> Branches {
    let mut branches = Branches::default();

    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() || line.contains(" -> ") {
            continue;
        }

        if let Some(remote) = line.strip_prefix(REMOTE_PREFIX) {
            branches.remote.push(remote.to_string());
        } else if line.starts_with("remotes/") {
            continue;
        } else if let Some(current) = line.strip_prefix("* ") {
            let current = current.trim();
            if current.starts_with('(') {
                continue;
            }
            branches.current = Some(current.to_string());
            branches.local.push(current.to_string());
        } else {
            branches.local.push(line.to_string());
        }
    }

    branches
}

/// Parse `git tag -l`.
pub fn parse_tags(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Split a release tag into `(name, version)`.
///
/// Both `fastqc.v0.2.0` and the legacy `fastqc.0.2.0` are accepted. Tags
/// that do not name a valid package version are not releases.
pub fn parse_release_tag(tag: &str) -> Option<(String, String)> {
    let (name, version) = tag.split_once('.')?;
    let version = version.trim_start_matches('v');
    if is_valid_name(name) && is_valid_version(version) {
        Some((name.to_string(), version.to_string()))
    } else {
        None
    }
}

/// Split a package branch `name@version`; other branches yield `None`.
pub fn parse_package_branch(branch: &str) -> Option<(String, String)> {
    let (name, version) = split_fullname(branch)?;
    if is_valid_name(name) && is_valid_version(version) {
        Some((name.to_string(), version.to_string()))
    } else {
        None
    }
}

/// Relation between the local branch and its upstream, from `git status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Behind,
    Ahead,
    Diverged,
    UpToDate,
    Clean,
    Unknown,
}

impl SyncStatus {
    /// Whether local and remote agree, or git did not say otherwise.
    pub fn is_synced(self) -> bool {
        matches!(self, Self::UpToDate | Self::Clean | Self::Unknown)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Behind => "behind",
            Self::Ahead => "ahead",
            Self::Diverged => "diverged",
            Self::UpToDate => "up_to_date",
            Self::Clean => "clean",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Classify `git status` output. Divergence outranks behind/ahead, which
/// outrank the good states.
pub fn classify_status(stdout: &str) -> SyncStatus {
    if stdout.contains("have diverged") {
        SyncStatus::Diverged
    } else if stdout.contains("is behind") {
        SyncStatus::Behind
    } else if stdout.contains("is ahead") {
        SyncStatus::Ahead
    } else if stdout.contains("up to date") || stdout.contains("up-to-date") {
        SyncStatus::UpToDate
    } else if stdout.contains("working tree clean") {
        SyncStatus::Clean
    } else {
        SyncStatus::Unknown
    }
}

/// Whether `git status` reports nothing to commit.
pub fn is_clean(stdout: &str) -> bool {
    stdout.contains("working tree clean")
}

/// Local branches whose upstream was deleted, from `git branch -vv`.
///
/// ```text
/// * main          3f1c2aa [origin/main] Merge pull request #12
///   fastqc@0.1.0  9d0e11b [origin/fastqc@0.1.0: gone] started a new version
/// ```
pub fn parse_gone_branches(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| line.contains(": gone]"))
        .filter_map(|line| {
            line.trim_start()
                .trim_start_matches('*')
                .split_whitespace()
                .next()
                .map(String::from)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("git version 2.39.2", Some((2, "2.39.2")))]
    #[case("git version 2.39.2 (Apple Git-143)", Some((2, "2.39.2")))]
    #[case("git version 1.8.3.1", Some((1, "1.8.3")))]
    #[case("git version 2.45.1.windows.1", Some((2, "2.45.1")))]
    #[case("command not found", None)]
    fn test_parse_version(#[case] stdout: &str, #[case] expected: Option<(u32, &str)>) {
        let parsed = parse_version(stdout).map(|v| (v.major, v.raw));
        assert_eq!(parsed, expected.map(|(m, r)| (m, r.to_string())));
    }

    #[test]
    fn test_parse_user_config() {
        let stdout = "\
credential.helper=osxkeychain
user.name=Global Name
user.email=global@example.org
core.bare=false
user.name=Local Name";
        let config = parse_user_config(stdout);
        assert_eq!(config.name.as_deref(), Some("Local Name"));
        assert_eq!(config.email.as_deref(), Some("global@example.org"));
    }

    #[test]
    fn test_parse_user_config_missing() {
        assert_eq!(parse_user_config("core.bare=false"), UserConfig::default());
    }

    #[test]
    fn test_parse_branches() {
        let stdout = "\
  demo-utils@1.3.0
* fastqc@0.2.0
  main
  remotes/origin/HEAD -> origin/main
  remotes/origin/fastqc@0.2.0
  remotes/origin/main
  remotes/upstream/main";
        let branches = parse_branches(stdout);

        assert_eq!(branches.current.as_deref(), Some("fastqc@0.2.0"));
        assert_eq!(branches.local, vec!["demo-utils@1.3.0", "fastqc@0.2.0", "main"]);
        assert_eq!(branches.remote, vec!["fastqc@0.2.0", "main"]);
    }

    #[test]
    fn test_parse_branches_detached_head() {
        let stdout = "* (HEAD detached at fastqc.v0.2.0)\n  main";
        let branches = parse_branches(stdout);
        assert_eq!(branches.current, None);
        assert_eq!(branches.local, vec!["main"]);
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            parse_tags("fastqc.v0.1.0\n\nfastqc.v0.2.0\n"),
            vec!["fastqc.v0.1.0", "fastqc.v0.2.0"]
        );
    }

    #[rstest]
    #[case("fastqc.v0.2.0", Some(("fastqc", "0.2.0")))]
    #[case("bar.0.2.0", Some(("bar", "0.2.0")))]
    #[case("demo-utils.v1.0.0-rc.1", Some(("demo-utils", "1.0.0-rc.1")))]
    #[case("v1.0.0", None)]
    #[case("fastqc", None)]
    #[case("fastqc.latest", None)]
    fn test_parse_release_tag(#[case] tag: &str, #[case] expected: Option<(&str, &str)>) {
        assert_eq!(
            parse_release_tag(tag),
            expected.map(|(n, v)| (n.to_string(), v.to_string()))
        );
    }

    #[rstest]
    #[case("fastqc@0.2.0", Some(("fastqc", "0.2.0")))]
    #[case("main", None)]
    #[case("feature@next", None)]
    fn test_parse_package_branch(#[case] branch: &str, #[case] expected: Option<(&str, &str)>) {
        assert_eq!(
            parse_package_branch(branch),
            expected.map(|(n, v)| (n.to_string(), v.to_string()))
        );
    }

    #[rstest]
    #[case(
        "On branch main\nYour branch is up to date with 'origin/main'.\n\nnothing to commit, working tree clean",
        SyncStatus::UpToDate
    )]
    #[case(
        "On branch main\nYour branch is behind 'origin/main' by 2 commits, and can be fast-forwarded.",
        SyncStatus::Behind
    )]
    #[case(
        "On branch main\nYour branch is ahead of 'origin/main' by 1 commit.\n  (use \"git push\" to publish your local commits)",
        SyncStatus::Ahead
    )]
    #[case(
        "On branch main\nYour branch and 'origin/main' have diverged,\nand have 1 and 2 different commits each, respectively.",
        SyncStatus::Diverged
    )]
    #[case("On branch main\nnothing to commit, working tree clean", SyncStatus::Clean)]
    #[case("On branch main\nChanges not staged for commit:", SyncStatus::Unknown)]
    fn test_classify_status(#[case] stdout: &str, #[case] expected: SyncStatus) {
        assert_eq!(classify_status(stdout), expected);
    }

    #[test]
    fn test_sync_status_is_synced() {
        assert!(SyncStatus::UpToDate.is_synced());
        assert!(SyncStatus::Unknown.is_synced());
        assert!(!SyncStatus::Behind.is_synced());
        assert!(!SyncStatus::Diverged.is_synced());
    }

    #[test]
    fn test_is_clean() {
        assert!(is_clean("On branch main\nnothing to commit, working tree clean"));
        assert!(!is_clean("On branch main\nUntracked files:\n  fastqc/new.nf"));
    }

    #[test]
    fn test_parse_gone_branches() {
        let stdout = "\
* main          3f1c2aa [origin/main] Merge pull request #12
  fastqc@0.1.0  9d0e11b [origin/fastqc@0.1.0: gone] started a new version
  local-only    1111111 scratch work
  utils@1.0.0   2222222 [origin/utils@1.0.0: gone] wip";
        assert_eq!(parse_gone_branches(stdout), vec!["fastqc@0.1.0", "utils@1.0.0"]);
    }
}
