//! `workon` and `nextver` against a scripted repository

use std::sync::Arc;

use pretty_assertions::assert_eq;
use wfpm_core::{Error, ErrorKind, FocusState, StartedFrom, VersionLifecycle, WorkonOutcome};
use wfpm_git::GitClient;
use wfpm_test_utils::git::{CLEAN_STATUS, branch_listing};
use wfpm_test_utils::{ScriptedGit, TestProject};

const BEHIND_STATUS: &str = "On branch main\n\
    Your branch is behind 'origin/main' by 2 commits, and can be fast-forwarded.\n\n\
    nothing to commit, working tree clean";
const DIVERGED_STATUS: &str = "On branch foo@1.1.0\n\
    Your branch and 'origin/foo@1.1.0' have diverged,\n\
    and have 1 and 3 different commits each, respectively.\n\n\
    nothing to commit, working tree clean";
const DIRTY_STATUS: &str = "On branch main\nChanges not staged for commit:\n\tmodified:   foo/main.nf";

fn repo() -> ScriptedGit {
    ScriptedGit::new()
        .user("Jane Doe", "jane@example.org")
        .status(CLEAN_STATUS)
}

fn project() -> TestProject {
    let tp = TestProject::new();
    tp.add_package("foo", "1.0.0", &[]);
    tp
}

fn lifecycle(tp: &TestProject, cwd: &str, git: &Arc<ScriptedGit>) -> VersionLifecycle {
    let client: Arc<dyn GitClient> = git.clone();
    VersionLifecycle::new(tp.load(cwd, client).unwrap())
}

fn precondition_message(err: Error) -> String {
    assert_eq!(err.kind(), ErrorKind::Precondition, "unexpected error: {err}");
    err.to_string()
}

mod workon {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report() {
        let tp = project();
        let git = Arc::new(
            repo()
                .branches("main", &["foo@1.1.0", "remotes/origin/bar@0.1.0"])
                .tags(&["foo.v1.0.0"]),
        );
        let mut lc = lifecycle(&tp, "", &git);

        let outcome = lc.workon(None, false, false).unwrap();

        let WorkonOutcome::Report(report) = outcome else {
            panic!("expected a report");
        };
        assert_eq!(report.releases.get("foo"), Some(&vec!["1.0.0".to_string()]));
        assert_eq!(report.in_development.len(), 2);
        assert_eq!(report.workon, None);
        assert!(git.mutations().is_empty());
    }

    #[test]
    fn test_switch_by_name() {
        let tp = project();
        let git = Arc::new(
            repo()
                .branches("main", &["foo@1.1.0"])
                .tags(&["foo.v1.0.0"])
                .after("checkout foo@1.1.0", "branch -a", &branch_listing("foo@1.1.0", &["main"])),
        );
        let mut lc = lifecycle(&tp, "", &git);
        assert_eq!(lc.state(), FocusState::Idle);

        let outcome = lc.workon(Some("foo"), false, false).unwrap();

        assert_eq!(
            outcome,
            WorkonOutcome::Switched {
                package: "foo@1.1.0".into()
            }
        );
        assert_eq!(outcome.to_string(), "Now work on 'foo@1.1.0'");
        assert_eq!(git.mutations(), vec!["checkout foo@1.1.0", "clean -xdf wfpr_modules"]);
        assert_eq!(lc.project().pkg_workon(), Some("foo@1.1.0"));
        assert_eq!(
            lc.state(),
            FocusState::InDevelopment {
                name: "foo".into(),
                version: "1.1.0".into()
            }
        );
    }

    #[test]
    fn test_switch_between_packages_cleans_the_one_left() {
        let tp = project();
        tp.add_package("bar", "0.1.0", &[]);
        let git = Arc::new(repo().branches("foo@1.1.0", &["main", "bar@0.1.0"]));
        let mut lc = lifecycle(&tp, "", &git);

        lc.workon(Some("bar@0.1.0"), false, false).unwrap();

        assert_eq!(
            git.mutations(),
            vec!["checkout bar@0.1.0", "clean -xdf wfpr_modules foo"]
        );
    }

    #[test]
    fn test_same_package_is_unchanged() {
        let tp = project();
        let git = Arc::new(repo().branches("foo@1.1.0", &["main"]));
        let mut lc = lifecycle(&tp, "", &git);

        for pkg in ["foo", "foo@1.1.0"] {
            let outcome = lc.workon(Some(pkg), false, false).unwrap();
            assert_eq!(
                outcome.to_string(),
                "Continue working on 'foo@1.1.0', no change."
            );
        }
        assert!(git.mutations().is_empty());
    }

    #[test]
    fn test_ambiguous_name() {
        let tp = project();
        let git = Arc::new(repo().branches("main", &["foo@1.1.0", "foo@1.2.0"]));
        let mut lc = lifecycle(&tp, "", &git);

        let err = lc.workon(Some("foo"), false, false).unwrap_err();

        let message = precondition_message(err);
        assert!(message.starts_with(
            "Multiple versions of the package are in development: 1.2.0, 1.1.0"
        ));
        assert!(message.contains("'wfpm workon foo@1.2.0' or 'wfpm workon foo@1.1.0'"));
        assert!(git.mutations().is_empty());
    }

    #[test]
    fn test_not_in_development() {
        let tp = project();
        let git = Arc::new(repo().branches("main", &["foo@1.1.0"]).tags(&["foo.v1.0.0"]));
        let mut lc = lifecycle(&tp, "", &git);

        for pkg in ["bar", "foo@1.0.0", "foo@9.9.9"] {
            let outcome = lc.workon(Some(pkg), false, false).unwrap();
            assert_eq!(
                outcome,
                WorkonOutcome::NotInDevelopment {
                    package: pkg.into()
                }
            );
        }
    }

    #[test]
    fn test_switch_requires_project_root() {
        let tp = project();
        let git = Arc::new(repo().branches("main", &["foo@1.1.0"]));
        let mut lc = lifecycle(&tp, "foo", &git);

        let err = lc.workon(Some("foo"), false, false).unwrap_err();

        assert!(matches!(err, Error::NotAtProjectRoot { .. }));
        assert!(git.mutations().is_empty());
    }

    #[test]
    fn test_stop() {
        let tp = project();
        let git = Arc::new(
            repo()
                .branches("foo@1.1.0", &["main"])
                .after("checkout main", "branch -a", &branch_listing("main", &["foo@1.1.0"])),
        );
        let mut lc = lifecycle(&tp, "", &git);

        let outcome = lc.workon(None, true, false).unwrap();

        assert_eq!(outcome.to_string(), "Stopped work on foo@1.1.0");
        assert_eq!(
            git.mutations(),
            vec!["checkout main", "clean -xdf wfpr_modules foo"]
        );
        assert_eq!(lc.state(), FocusState::Idle);
    }

    #[test]
    fn test_stop_requires_clean_branch() {
        let tp = project();
        let git = Arc::new(repo().branches("foo@1.1.0", &["main"]).status(DIRTY_STATUS));
        let mut lc = lifecycle(&tp, "", &git);

        let err = lc.workon(None, true, false).unwrap_err();

        assert_eq!(
            precondition_message(err),
            "Package branch 'foo@1.1.0' not clean, please complete on-going work and commit changes."
        );
        assert!(git.mutations().is_empty());
    }

    #[test]
    fn test_stop_when_idle() {
        let tp = project();
        let git = Arc::new(repo().branches("main", &[]));
        let mut lc = lifecycle(&tp, "", &git);

        let outcome = lc.workon(None, true, false).unwrap();
        assert_eq!(outcome, WorkonOutcome::NotWorkingOnAny);
    }

    #[test]
    fn test_stop_with_package_rejected() {
        let tp = project();
        let git = Arc::new(repo().branches("foo@1.1.0", &["main"]));
        let mut lc = lifecycle(&tp, "", &git);

        let err = lc.workon(Some("foo"), true, false).unwrap_err();
        assert_eq!(
            precondition_message(err),
            "When '-s' is used, no pkg argument can be supplied."
        );
    }

    #[test]
    fn test_released_branch_blocks_everything() {
        let tp = project();
        let git = Arc::new(repo().branches("foo@1.0.0", &["main"]).tags(&["foo.v1.0.0"]));
        let mut lc = lifecycle(&tp, "", &git);
        assert!(matches!(lc.state(), FocusState::Released { .. }));

        let err = lc.workon(None, false, false).unwrap_err();

        let message = precondition_message(err);
        assert!(message.starts_with("You are on a package branch that has been released 'foo@1.0.0'."));
        assert!(message.contains("run 'git branch -D foo@1.0.0'"));
    }

    #[test]
    fn test_update_only_on_main() {
        let tp = project();
        let git = Arc::new(repo().branches("foo@1.1.0", &["main"]));
        let mut lc = lifecycle(&tp, "", &git);

        let err = lc.workon(None, false, true).unwrap_err();

        assert_eq!(
            precondition_message(err),
            "Can only use '-u' when on the 'main' branch, currently on 'foo@1.1.0'"
        );
        assert!(!git.ran("fetch --all --tags"));
    }

    #[test]
    fn test_update_prunes_gone_branches() {
        let tp = project();
        let git = Arc::new(
            repo()
                .branches("main", &["foo@1.1.0"])
                .respond(
                    "branch -vv",
                    "* main      3f1c2aa [origin/main] Merge\n  foo@1.1.0 9d0e11b [origin/foo@1.1.0: gone] wip",
                )
                .after("branch -D foo@1.1.0", "branch -a", "* main"),
        );
        let mut lc = lifecycle(&tp, "", &git);

        let outcome = lc.workon(None, false, true).unwrap();

        let WorkonOutcome::Report(report) = outcome else {
            panic!("expected a report");
        };
        assert!(report.in_development.is_empty());
        assert_eq!(
            git.mutations(),
            vec![
                "fetch --all --tags",
                "remote prune origin",
                "branch -vv",
                "branch -D foo@1.1.0"
            ]
        );
    }
}

mod nextver {
    use super::*;
    use pretty_assertions::assert_eq;

    fn released_repo(tag: &str, new_branch: &str) -> ScriptedGit {
        repo().branches("main", &[]).tags(&[tag]).after(
            &format!("checkout tags/{tag} -b {new_branch}"),
            "branch -a",
            &branch_listing(new_branch, &["main"]),
        )
    }

    #[test]
    fn test_from_released_version() {
        let tp = project();
        let git = Arc::new(released_repo("foo.v1.0.0", "foo@1.1.0"));
        let mut lc = lifecycle(&tp, "", &git);

        let outcome = lc.nextver("foo@1.0.0", "1.1.0").unwrap();

        assert_eq!(outcome.package, "foo@1.1.0");
        assert_eq!(outcome.started_from, StartedFrom::Released);
        assert!(outcome.to_string().starts_with("Started a new package version: foo@1.1.0\n"));

        let mutations = git.mutations();
        assert_eq!(
            &mutations[..5],
            &[
                "fetch --all --tags",
                "remote prune origin",
                "branch -vv",
                "checkout tags/foo.v1.0.0 -b foo@1.1.0",
                "add foo"
            ]
        );
        assert!(mutations[5].starts_with("commit -m [wfpm v"));
        assert!(mutations[5].ends_with("started a new version foo@1.1.0 from foo@1.0.0 which was released"));

        let manifest: serde_json::Value = serde_json::from_str(&tp.read("foo/pkg.json")).unwrap();
        assert_eq!(manifest["version"], "1.1.0");
        assert!(tp.read("foo/main.nf").contains("version = '1.1.0'"));
        assert!(tp.read("foo/tests/checker.nf").contains("version = '1.1.0'"));
        assert_eq!(lc.project().pkg_workon(), Some("foo@1.1.0"));
    }

    #[test]
    fn test_legacy_tag_used_when_no_v_tag() {
        let tp = project();
        let git = Arc::new(released_repo("foo.1.0.0", "foo@1.1.0"));
        let mut lc = lifecycle(&tp, "", &git);

        lc.nextver("foo@1.0.0", "1.1.0").unwrap();

        assert!(git.ran("checkout tags/foo.1.0.0 -b foo@1.1.0"));
    }

    #[test]
    fn test_from_version_in_development() {
        let tp = project();
        let git = Arc::new(
            repo()
                .branches("main", &["foo@1.1.0"])
                .tags(&["foo.v1.0.0"])
                .after(
                    "checkout -b foo@1.2.0",
                    "branch -a",
                    &branch_listing("foo@1.2.0", &["main", "foo@1.1.0"]),
                ),
        );
        let mut lc = lifecycle(&tp, "", &git);

        let outcome = lc.nextver("foo@1.1.0", "1.2.0").unwrap();

        assert_eq!(outcome.started_from, StartedFrom::InDevelopment);
        let mutations = git.mutations();
        assert_eq!(
            &mutations[3..5],
            &["checkout foo@1.1.0", "checkout -b foo@1.2.0"]
        );
        assert!(mutations.last().unwrap().ends_with("which was in development"));
    }

    #[test]
    fn test_version_must_increase() {
        let tp = project();
        let git = Arc::new(released_repo("foo.v1.0.0", "foo@1.1.0"));
        let mut lc = lifecycle(&tp, "", &git);

        for version in ["0.9.0", "1.0.0"] {
            let err = lc.nextver("foo@1.0.0", version).unwrap_err();
            assert_eq!(
                precondition_message(err),
                format!("New version '{version}' must be higher than the starting version '1.0.0'")
            );
        }
        assert!(git.mutations().is_empty());
        assert!(tp.read("foo/pkg.json").contains("\"1.0.0\""));
    }

    #[test]
    fn test_argument_validation() {
        let tp = project();
        let git = Arc::new(released_repo("foo.v1.0.0", "foo@1.1.0"));
        let mut lc = lifecycle(&tp, "", &git);

        let err = lc.nextver("foo", "1.1.0").unwrap_err();
        assert_eq!(
            precondition_message(err),
            "Please specify package full name, ie, <pkg_name>@<version>"
        );

        let err = lc.nextver("foo@1.0.0", "1.1").unwrap_err();
        assert!(precondition_message(err).starts_with("Specified new version is not valid"));
    }

    #[test]
    fn test_requires_project_root() {
        let tp = project();
        let git = Arc::new(released_repo("foo.v1.0.0", "foo@1.1.0"));
        let mut lc = lifecycle(&tp, "foo", &git);

        let err = lc.nextver("foo@1.0.0", "1.1.0").unwrap_err();
        assert!(matches!(err, Error::NotAtProjectRoot { .. }));
    }

    #[test]
    fn test_requires_git_identity() {
        let tp = project();
        let git = Arc::new(
            ScriptedGit::new()
                .status(CLEAN_STATUS)
                .branches("main", &[])
                .tags(&["foo.v1.0.0"]),
        );
        let mut lc = lifecycle(&tp, "", &git);

        let err = lc.nextver("foo@1.0.0", "1.1.0").unwrap_err();
        assert!(precondition_message(err).starts_with("Git not configured with 'user.name' and 'user.email'"));
    }

    #[test]
    fn test_must_stop_working_first() {
        let tp = project();
        let git = Arc::new(repo().branches("foo@1.1.0", &["main"]).tags(&["foo.v1.0.0"]));
        let mut lc = lifecycle(&tp, "", &git);

        let err = lc.nextver("foo@1.0.0", "1.2.0").unwrap_err();
        assert_eq!(
            precondition_message(err),
            "Must stop working on 'foo@1.1.0' before creating a new package version. Please run: wfpm workon -s"
        );
    }

    #[test]
    fn test_requires_main_branch() {
        let tp = project();
        let git = Arc::new(repo().branches("feature", &["main"]).tags(&["foo.v1.0.0"]));
        let mut lc = lifecycle(&tp, "", &git);

        let err = lc.nextver("foo@1.0.0", "1.1.0").unwrap_err();
        assert_eq!(
            precondition_message(err),
            "Must run this command on main branch, current branch: feature"
        );
    }

    #[test]
    fn test_requires_clean_main() {
        let tp = project();
        let git = Arc::new(released_repo("foo.v1.0.0", "foo@1.1.0").status(DIRTY_STATUS));
        let mut lc = lifecycle(&tp, "", &git);

        let err = lc.nextver("foo@1.0.0", "1.1.0").unwrap_err();
        assert_eq!(
            precondition_message(err),
            "Git branch 'main' not clean. Please complete current work and commit changes."
        );
    }

    #[test]
    fn test_fetch_failure() {
        let tp = project();
        let git = Arc::new(
            released_repo("foo.v1.0.0", "foo@1.1.0").fail("fetch --all --tags", 128, "fatal: unable to access"),
        );
        let mut lc = lifecycle(&tp, "", &git);

        let err = lc.nextver("foo@1.0.0", "1.1.0").unwrap_err();
        assert!(precondition_message(err).starts_with("Unable to fetch branches/tags from remote."));
        assert!(!git.ran("remote prune origin"));
    }

    #[test]
    fn test_main_behind_remote() {
        let tp = project();
        let git = Arc::new(
            ScriptedGit::new()
                .user("Jane Doe", "jane@example.org")
                .status(BEHIND_STATUS)
                .branches("main", &[])
                .tags(&["foo.v1.0.0"]),
        );
        let mut lc = lifecycle(&tp, "", &git);

        let err = lc.nextver("foo@1.0.0", "1.1.0").unwrap_err();
        assert_eq!(
            precondition_message(err),
            "Local 'main' branch is behind the remote. Please 'git pull' to update."
        );
        assert!(!git.ran("checkout tags/foo.v1.0.0 -b foo@1.1.0"));
    }

    #[test]
    fn test_candidate_branch_diverged_from_remote() {
        let tp = project();
        let git = Arc::new(
            repo()
                .branches("main", &["foo@1.1.0"])
                .tags(&["foo.v1.0.0"])
                .after("checkout foo@1.1.0", "status", DIVERGED_STATUS),
        );
        let mut lc = lifecycle(&tp, "", &git);

        let err = lc.nextver("foo@1.1.0", "1.2.0").unwrap_err();

        assert_eq!(
            precondition_message(err),
            "Local 'foo@1.1.0' branch has diverged from remote. \
             Please resolve the changes and synchronize."
        );
        assert!(git.ran("checkout foo@1.1.0"));
        assert!(!git.ran("checkout -b foo@1.2.0"));
        assert!(git.mutations().iter().all(|c| !c.starts_with("commit")));
    }

    #[test]
    fn test_new_version_already_exists() {
        let tp = project();
        let git = Arc::new(repo().branches("main", &["foo@1.1.0"]).tags(&["foo.v1.0.0"]));
        let mut lc = lifecycle(&tp, "", &git);

        let err = lc.nextver("foo@1.0.0", "1.1.0").unwrap_err();
        assert_eq!(
            precondition_message(err),
            "Specified new version already exists: foo@1.1.0"
        );
    }

    #[test]
    fn test_unknown_package() {
        let tp = project();
        let git = Arc::new(repo().branches("main", &[]).tags(&["foo.v1.0.0"]));
        let mut lc = lifecycle(&tp, "", &git);

        let err = lc.nextver("bar@1.0.0", "1.1.0").unwrap_err();
        assert_eq!(
            precondition_message(err),
            "No package found as: 'bar@1.0.0'. Run 'wfpm workon' to display package info."
        );
    }
}
