//! Error types for wfpm-package

/// Result type for wfpm-package operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing package identities and manifests
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "Invalid package uri: {uri}, expected format: \
         repo_server/repo_account/repo_name/pkg_name@pkg_version"
    )]
    MalformedUri { uri: String },

    #[error("Invalid package name: {name}, expected name pattern: {pattern}")]
    InvalidName { name: String, pattern: &'static str },

    #[error("Invalid package version: {version}, expected version pattern: {pattern}")]
    InvalidVersion {
        version: String,
        pattern: &'static str,
    },

    #[error("Invalid repository url '{url}', expected form: https://host/account/repo.git")]
    InvalidRepositoryUrl { url: String },

    #[error("Invalid manifest {origin}: {reason}")]
    InvalidManifest { origin: String, reason: String },

    #[error("Failed to parse manifest {origin}: {message}")]
    ManifestParse { origin: String, message: String },

    #[error(transparent)]
    Fs(#[from] wfpm_fs::Error),
}
