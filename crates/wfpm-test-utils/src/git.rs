//! [`ScriptedGit`]: a git client that answers from a script.
//!
//! Commands are matched by their arguments joined with single spaces, e.g.
//! `"branch -a"`. Each command has a queue of answers; the last answer keeps
//! repeating. Unscripted commands succeed with empty output, except
//! `--version` which reports git 2.39.2.
//!
//! Answers can change when another command runs, which models the effect of
//! `checkout` on `branch -a`:
//!
//! ```rust
//! use wfpm_test_utils::ScriptedGit;
//!
//! let git = ScriptedGit::new()
//!     .branches("main", &["foo@1.2.0"])
//!     .after("checkout foo@1.2.0", "branch -a", "* foo@1.2.0\n  main");
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use wfpm_git::{CommandOutput, GitClient};

pub const DEFAULT_VERSION: &str = "git version 2.39.2";
pub const CLEAN_STATUS: &str = "On branch main\nYour branch is up to date with 'origin/main'.\n\nnothing to commit, working tree clean";

#[derive(Default)]
struct Script {
    answers: HashMap<String, VecDeque<CommandOutput>>,
    triggers: Vec<(String, String, CommandOutput)>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct ScriptedGit {
    script: Mutex<Script>,
    missing: bool,
}

fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        stdout: stdout.to_string(),
        stderr: String::new(),
        code: 0,
    }
}

/// `git branch -a` output with `current` checked out.
pub fn branch_listing(current: &str, others: &[&str]) -> String {
    let mut lines = vec![format!("* {current}")];
    lines.extend(others.iter().map(|b| format!("  {b}")));
    lines.join("\n")
}

impl ScriptedGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client for a machine without git: every command fails to start.
    pub fn missing() -> Self {
        Self {
            missing: true,
            ..Self::default()
        }
    }

    fn push(self, args: &str, output: CommandOutput) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            script
                .answers
                .entry(args.to_string())
                .or_default()
                .push_back(output);
        }
        self
    }

    /// Queue a successful answer for `args`.
    pub fn respond(self, args: &str, stdout: &str) -> Self {
        self.push(args, ok(stdout))
    }

    /// Queue a failing answer for `args`.
    pub fn fail(self, args: &str, code: i32, stderr: &str) -> Self {
        self.push(
            args,
            CommandOutput {
                stdout: String::new(),
                stderr: stderr.to_string(),
                code,
            },
        )
    }

    /// Once `trigger` runs, `args` answers `stdout` from then on.
    pub fn after(self, trigger: &str, args: &str, stdout: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .triggers
            .push((trigger.to_string(), args.to_string(), ok(stdout)));
        self
    }

    pub fn user(self, name: &str, email: &str) -> Self {
        self.respond(
            "config --list",
            &format!("core.bare=false\nuser.name={name}\nuser.email={email}"),
        )
    }

    pub fn branches(self, current: &str, others: &[&str]) -> Self {
        self.respond("branch -a", &branch_listing(current, others))
    }

    pub fn tags(self, tags: &[&str]) -> Self {
        self.respond("tag -l", &tags.join("\n"))
    }

    pub fn status(self, stdout: &str) -> Self {
        self.respond("status", stdout)
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn ran(&self, args: &str) -> bool {
        self.calls().iter().any(|c| c == args)
    }

    /// Commands run so far, excluding the read-only queries a project load
    /// issues.
    pub fn mutations(&self) -> Vec<String> {
        const QUERIES: [&str; 5] = ["--version", "config --list", "branch -a", "tag -l", "status"];
        self.calls()
            .into_iter()
            .filter(|c| !QUERIES.contains(&c.as_str()))
            .collect()
    }
}

impl GitClient for ScriptedGit {
    fn run(&self, args: &[&str]) -> wfpm_git::Result<CommandOutput> {
        if self.missing {
            return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "git: not found").into());
        }

        let key = args.join(" ");
        let mut script = self.script.lock().unwrap();
        script.calls.push(key.clone());

        let output = match script.answers.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None if key == "--version" => ok(DEFAULT_VERSION),
            None => CommandOutput::default(),
        };

        let fired: Vec<(String, CommandOutput)> = script
            .triggers
            .iter()
            .filter(|(trigger, _, _)| *trigger == key)
            .map(|(_, args, output)| (args.clone(), output.clone()))
            .collect();
        for (args, output) in fired {
            script.answers.insert(args, VecDeque::from([output]));
        }

        Ok(output)
    }
}
