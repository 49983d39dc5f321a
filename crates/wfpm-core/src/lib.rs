//! Core orchestration for the workflow package manager
//!
//! This crate implements:
//!
//! - **Project**: the `.wfpm` project, its local and installed packages and
//!   the package currently being worked on
//! - **Dependency resolution**: expansion of a manifest's dependencies into a
//!   cycle-checked [`DependencyGraph`]
//! - **Installation**: ordered fetch and unpack of release artifacts into
//!   the module cache, tolerating per-package failures
//! - **Version lifecycle**: `workon` and `nextver`, driven entirely by git
//!   branches and tags
//!
//! # Architecture
//!
//! ```text
//!                      wfpm-cli
//!                         |
//!                     wfpm-core
//!                         |
//!        +----------------+-----------------+
//!        |                |                 |
//!     wfpm-fs       wfpm-package        wfpm-git
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod graph;
pub mod install;
pub mod lifecycle;
pub mod project;
pub mod resolver;
pub mod tester;

pub use config::{ProjectConfig, Settings};
pub use error::{Error, ErrorKind, Result};
pub use fetch::{HttpReleaseHost, ReleaseHost};
pub use graph::DependencyGraph;
pub use install::{InstallOutcome, InstallReport, Installer};
pub use lifecycle::{
    FocusState, NextverOutcome, StartedFrom, VersionLifecycle, WorkonOutcome, WorkonReport,
};
pub use project::Project;
pub use resolver::{DependencyResolver, ManifestSource, RemoteManifestSource};
pub use tester::{NextflowTester, PackageTester, TestSummary};
