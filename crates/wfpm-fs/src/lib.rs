//! Filesystem helpers for the workflow package manager
//!
//! Provides project marker discovery, atomic writes, format-aware
//! configuration loading and the small set of tree operations the
//! installation engine needs (symlinks, best-effort removal).

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod locate;

pub use config::{ConfigFormat, ConfigStore};
pub use constants::WfpmPath;
pub use error::{Error, Result};
pub use locate::find_upwards;
