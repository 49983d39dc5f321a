//! Git state tracking for the workflow package manager
//!
//! The git repository is the only record of which package versions are
//! released (tags) and which are in development (branches). This crate
//! queries git through the [`GitClient`] capability, parses its output and
//! derives the [`GitLedger`].

pub mod client;
pub mod error;
pub mod ledger;
pub mod parse;
pub mod tracker;

pub use client::{CommandOutput, GitClient, SystemGit};
pub use error::{Error, Result};
pub use ledger::GitLedger;
pub use parse::SyncStatus;
pub use tracker::GitStateTracker;
