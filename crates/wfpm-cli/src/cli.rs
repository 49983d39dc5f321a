//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};

/// Workflow package manager - develop, release and install workflow packages
#[derive(Parser, Debug)]
#[command(name = "wfpm")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Show debug information
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Install the dependencies of the package in the current directory
    ///
    /// Must be run in a package directory directly under the project root.
    /// Dependencies are installed into the project's module cache in
    /// dependency order and tested after installation.
    Install {
        /// Force installation even if already installed
        #[arg(short, long)]
        force: bool,

        /// Do not run tests after installation
        #[arg(short = 'T', long)]
        skip_tests: bool,
    },

    /// List local packages and installed dependencies
    List,

    /// Run package tests
    ///
    /// Tests the package being worked on, or every local package when run at
    /// the project root.
    Test,

    /// Show packages in development, or start or stop working on one
    ///
    /// Examples:
    ///   wfpm workon                  # Show released and in-development versions
    ///   wfpm workon fastqc           # Work on the only version of fastqc in development
    ///   wfpm workon fastqc@0.2.0     # Work on a specific version
    ///   wfpm workon -s               # Stop working, back to main
    ///   wfpm workon -u               # Update from remote first
    Workon {
        /// Package to work on: name or name@version
        pkg: Option<String>,

        /// Stop working on the current package
        #[arg(short, long)]
        stop: bool,

        /// Fetch branches and tags from the remote first
        #[arg(short, long)]
        update: bool,
    },

    /// Start a new version of a package
    ///
    /// Examples:
    ///   wfpm nextver fastqc@0.2.0 0.3.0
    Nextver {
        /// Package to start from: name@version
        pkg: String,

        /// New version number
        version: String,
    },
}
