//! Package identity and metadata for the workflow package manager.
//!
//! This crate provides:
//! - [`PackageUri`], the canonical `host/account/repo/name@version` identity
//! - [`Manifest`], the validated contents of a `pkg.json` / `pkg-release.json`
//! - Loose version ordering used by the git release ledger
//! - Release tag and artifact URL naming, including the legacy tag fallback
//! - Reading and rewriting the `version` marker inside package scripts

pub mod error;
pub mod manifest;
pub mod naming;
pub mod release;
pub mod script;
pub mod uri;
pub mod version;

pub use error::{Error, Result};
pub use manifest::{Manifest, Repository, rewrite_manifest_version};
pub use naming::{PKG_NAME_PATTERN, PKG_VERSION_PATTERN, validate_name, validate_version};
pub use uri::PackageUri;
pub use version::LooseVersion;
