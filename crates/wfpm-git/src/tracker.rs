//! Snapshot of repository state plus the git operations the lifecycle needs

use std::sync::Arc;

use crate::client::{CommandOutput, GitClient};
use crate::ledger::GitLedger;
use crate::parse::{self, Branches, SyncStatus, UserConfig};
use crate::{Error, Result};

const MIN_GIT_MAJOR: u32 = 2;

/// Stdout of a read-only query; failures read as empty output.
fn query(client: &dyn GitClient, args: &[&str]) -> String {
    match client.run(args) {
        Ok(out) if out.success() => out.stdout,
        Ok(out) => {
            tracing::debug!(args = ?args, stderr = %out.stderr, "git query failed");
            String::new()
        }
        Err(e) => {
            tracing::debug!(args = ?args, error = %e, "git query failed");
            String::new()
        }
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    version: String,
    user: UserConfig,
    branches: Branches,
    tags: Vec<String>,
    ledger: GitLedger,
}

/// Repository state read once at construction.
///
/// Branch, tag and ledger information never changes after [`new`](Self::new);
/// after a mutating operation callers build a fresh tracker to observe the
/// result. When git is missing or older than 2.0 the tracker is
/// *unavailable*: every query returns empty state and every operation fails
/// with [`Error::Unavailable`].
pub struct GitStateTracker {
    client: Arc<dyn GitClient>,
    main_branch: String,
    snapshot: Option<Snapshot>,
}

impl std::fmt::Debug for GitStateTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitStateTracker")
            .field("main_branch", &self.main_branch)
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

impl GitStateTracker {
    pub fn new(client: Arc<dyn GitClient>, main_branch: impl Into<String>) -> Self {
        let main_branch = main_branch.into();
        let snapshot = Self::read_snapshot(client.as_ref());
        Self {
            client,
            main_branch,
            snapshot,
        }
    }

    fn read_snapshot(client: &dyn GitClient) -> Option<Snapshot> {
        let version = match client.run(&["--version"]) {
            Ok(out) if out.success() => parse::parse_version(&out.stdout),
            Ok(out) => {
                tracing::debug!(stderr = %out.stderr, "git --version failed");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "git not available");
                None
            }
        };
        let version = match version {
            Some(v) if v.major >= MIN_GIT_MAJOR => v.raw,
            Some(v) => {
                tracing::warn!(version = %v.raw, "git version too old, need 2.0 or later");
                return None;
            }
            None => return None,
        };

        let user = parse::parse_user_config(&query(client, &["config", "--list"]));
        let branches = parse::parse_branches(&query(client, &["branch", "-a"]));
        let tags = parse::parse_tags(&query(client, &["tag", "-l"]));

        let ledger = GitLedger::from_refs(
            tags.iter().map(String::as_str),
            branches
                .local
                .iter()
                .chain(branches.remote.iter())
                .map(String::as_str),
        );

        tracing::debug!(
            version = %version,
            current = ?branches.current,
            tags = tags.len(),
            "Read git state"
        );

        Some(Snapshot {
            version,
            user,
            branches,
            tags,
            ledger,
        })
    }

    pub fn is_available(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Git version, e.g. `2.39.2`.
    pub fn version(&self) -> Option<&str> {
        self.snapshot.as_ref().map(|s| s.version.as_str())
    }

    /// Whether both `user.name` and `user.email` are configured.
    pub fn has_user_identity(&self) -> bool {
        self.snapshot
            .as_ref()
            .is_some_and(|s| s.user.name.is_some() && s.user.email.is_some())
    }

    pub fn main_branch(&self) -> &str {
        &self.main_branch
    }

    pub fn current_branch(&self) -> Option<&str> {
        self.snapshot
            .as_ref()
            .and_then(|s| s.branches.current.as_deref())
    }

    pub fn on_main_branch(&self) -> bool {
        self.current_branch() == Some(self.main_branch.as_str())
    }

    pub fn tags(&self) -> &[String] {
        self.snapshot
            .as_ref()
            .map(|s| s.tags.as_slice())
            .unwrap_or_default()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }

    /// Release ledger; empty when git is unavailable.
    pub fn ledger(&self) -> GitLedger {
        self.snapshot
            .as_ref()
            .map(|s| s.ledger.clone())
            .unwrap_or_default()
    }

    /// Classify the current `git status`.
    pub fn status(&self) -> Result<SyncStatus> {
        let out = self.exec("read git status", &["status"])?;
        Ok(parse::classify_status(&out.stdout))
    }

    /// Whether the working tree has nothing to commit.
    pub fn is_clean(&self) -> Result<bool> {
        let out = self.exec("read git status", &["status"])?;
        Ok(parse::is_clean(&out.stdout))
    }

    /// Check out `branch`, then remove ignored and untracked files below
    /// `cleanup_paths`.
    pub fn checkout_branch(&self, branch: &str, cleanup_paths: &[&str]) -> Result<()> {
        self.exec(&format!("switch to '{branch}'"), &["checkout", branch])?;

        if !cleanup_paths.is_empty() {
            let mut args = vec!["clean", "-xdf"];
            args.extend_from_slice(cleanup_paths);
            self.exec(&format!("clean up after switching to '{branch}'"), &args)?;
        }

        tracing::info!(branch, "Switched branch");
        Ok(())
    }

    /// Create and check out a new branch from the current one.
    pub fn new_branch(&self, branch: &str) -> Result<()> {
        self.exec(
            &format!("create new branch '{branch}'"),
            &["checkout", "-b", branch],
        )?;
        tracing::info!(branch, "Created branch");
        Ok(())
    }

    /// Create and check out a new branch starting at a tag.
    pub fn new_branch_from_tag(&self, tag: &str, branch: &str) -> Result<()> {
        let tag_ref = format!("tags/{tag}");
        self.exec(
            &format!("create new branch '{branch}' from tag '{tag}'"),
            &["checkout", tag_ref.as_str(), "-b", branch],
        )?;
        tracing::info!(branch, tag, "Created branch from tag");
        Ok(())
    }

    /// Stage `path` and commit it with `message`.
    pub fn add_and_commit(&self, path: &str, message: &str) -> Result<()> {
        self.exec(&format!("add '{path}'"), &["add", path])?;
        self.exec("commit", &["commit", "-m", message])?;
        tracing::info!(path, "Committed changes");
        Ok(())
    }

    /// Fetch branches and tags from all remotes, prune deleted remote
    /// branches and delete local branches whose upstream is gone.
    ///
    /// Only allowed on the main branch, since the current branch could be one
    /// of those deleted. Returns the deleted local branches.
    pub fn fetch_and_housekeeping(&self) -> Result<Vec<String>> {
        if !self.is_available() {
            return Err(Error::Unavailable);
        }
        if !self.on_main_branch() {
            return Err(Error::NotOnMainBranch {
                expected: self.main_branch.clone(),
                current: self.current_branch().unwrap_or("<none>").to_string(),
            });
        }

        self.exec("fetch from remote", &["fetch", "--all", "--tags"])?;
        self.exec("prune remote branches", &["remote", "prune", "origin"])?;

        let out = self.exec("list local branches", &["branch", "-vv"])?;
        let gone = parse::parse_gone_branches(&out.stdout);
        for branch in &gone {
            self.exec(
                &format!("delete local branch '{branch}'"),
                &["branch", "-D", branch],
            )?;
            tracing::info!(branch = %branch, "Deleted local branch with gone upstream");
        }

        Ok(gone)
    }

    fn exec(&self, action: &str, args: &[&str]) -> Result<CommandOutput> {
        if !self.is_available() {
            return Err(Error::Unavailable);
        }

        tracing::debug!(args = ?args, "git");
        let out = self.client.run(args)?;
        if out.success() {
            Ok(out)
        } else {
            Err(Error::CommandFailed {
                action: action.to_string(),
                code: out.code,
                stdout: out.stdout,
                stderr: out.stderr,
            })
        }
    }
}
