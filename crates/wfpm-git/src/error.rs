//! Error types for wfpm-git

/// Result type for wfpm-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in wfpm-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git not available or its version is lower than 2.0")]
    Unavailable,

    #[error("Failed to run git: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to {action}.\nSTDOUT: {stdout}\nSTDERR: {stderr}")]
    CommandFailed {
        action: String,
        code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("Must run this on the '{expected}' branch, current branch: {current}")]
    NotOnMainBranch { expected: String, current: String },
}
