//! Error types for wfpm-core

use std::path::PathBuf;

/// Result type for wfpm-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of an [`Error`], used by callers to decide whether to
/// continue with the next item or abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: URIs, manifests, dependency structure
    Validation,
    /// The repository or working directory is not in a state that allows
    /// the operation
    Precondition,
    /// Affects one item of a batch; the batch continues
    Recoverable,
    /// Git, network, archive or filesystem failure
    Infrastructure,
}

/// Errors that can occur in wfpm-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Validation
    /// A package lists itself as a dependency
    #[error("Package '{package}' depends on itself")]
    SelfDependency { package: String },

    /// Dependencies form a cycle
    #[error("Dependency cycle detected among: {}", participants.join(", "))]
    DependencyCycle { participants: Vec<String> },

    /// `.wfpm` exists but is not a valid project configuration
    #[error("Invalid .wfpm file: {path}, {reason}")]
    InvalidProjectConfig { path: PathBuf, reason: String },

    /// A local or installed manifest failed to load
    #[error("Problem encountered, invalid package json: {path}. {source}")]
    InvalidPackageJson {
        path: PathBuf,
        #[source]
        source: wfpm_package::Error,
    },

    // Precondition
    #[error("Not in a package project directory.")]
    NotInProject,

    #[error("Not in a package directory: {reason}")]
    NotInPackageDir { reason: String },

    #[error("Must run this command under the project root dir: {root}")]
    NotAtProjectRoot { root: PathBuf },

    #[error("{0}")]
    Precondition(String),

    // Recoverable
    #[error(
        "Package already installed: {}, skip unless force option is specified.",
        path.display()
    )]
    AlreadyInstalled { path: PathBuf },

    #[error("Looks like this package has not been released: {uri}")]
    NotReleased { uri: String },

    // Infrastructure
    #[error("Package downloaded but installation failed: {reason}")]
    InstallationFailure { uri: String, reason: String },

    #[error("HTTP request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    // Transparent wrappers for underlying crate errors
    #[error(transparent)]
    Package(#[from] wfpm_package::Error),

    #[error(transparent)]
    Git(#[from] wfpm_git::Error),

    #[error(transparent)]
    Fs(#[from] wfpm_fs::Error),
}

impl Error {
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SelfDependency { .. }
            | Self::DependencyCycle { .. }
            | Self::InvalidProjectConfig { .. }
            | Self::InvalidPackageJson { .. } => ErrorKind::Validation,

            Self::Package(wfpm_package::Error::Fs(_)) => ErrorKind::Infrastructure,
            Self::Package(_) => ErrorKind::Validation,

            Self::NotInProject
            | Self::NotInPackageDir { .. }
            | Self::NotAtProjectRoot { .. }
            | Self::Precondition(_) => ErrorKind::Precondition,

            Self::Git(wfpm_git::Error::NotOnMainBranch { .. }) => ErrorKind::Precondition,

            Self::AlreadyInstalled { .. } | Self::NotReleased { .. } => ErrorKind::Recoverable,

            Self::InstallationFailure { .. }
            | Self::Http { .. }
            | Self::Spawn { .. }
            | Self::Git(_)
            | Self::Fs(_) => ErrorKind::Infrastructure,
        }
    }
}
