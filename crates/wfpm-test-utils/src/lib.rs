//! Shared test utilities for the wfpm workspace.
//!
//! This crate provides test doubles and fixtures reused across crate test
//! suites. It is a dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`git`]: [`ScriptedGit`], a [`wfpm_git::GitClient`] answering from a script
//! - [`host`]: [`FakeReleaseHost`], an in-memory release server
//! - [`project`]: [`TestProject`] builder for package projects on disk

pub mod git;
pub mod host;
pub mod project;

pub use git::ScriptedGit;
pub use host::FakeReleaseHost;
pub use project::TestProject;
