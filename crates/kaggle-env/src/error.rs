//! Error types for provisioning.
//!
//! Only the fatal steps produce a [`ProvisionError`]. Advisory failures
//! (smoke-test imports, kernel registration) are reported through progress
//! events and recorded in the outcome instead.

use std::path::PathBuf;

/// Result type for provisioning operations.
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Errors that halt a provisioning run.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error(
        "No Python {version} interpreter found (tried: {}).\n\
         Install Python {version} from https://www.python.org/downloads/, \
         with your system package manager, or with `uv python install {version}`, \
         then run setup again.",
        tried.join(", ")
    )]
    InterpreterNotFound { version: String, tried: Vec<String> },

    #[error("Failed to create environment at {path}: {message}")]
    EnvironmentCreation { path: PathBuf, message: String },

    #[error("Environment directory {0} does not exist after creation")]
    EnvironmentMissing(PathBuf),

    #[error("Failed to install dependencies: {0}")]
    Install(String),

    #[error("Failed to write lock file: {0}")]
    Freeze(String),

    #[error("Failed to register kernel: {0}")]
    KernelRegistration(String),

    #[error("Setup aborted: {0}")]
    Aborted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
