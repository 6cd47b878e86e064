//! Error types for calmeet storage and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while resolving configuration or persisting tokens.
#[derive(Error, Debug)]
pub enum CalmeetError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error(
        "Google client credentials not found at {0}\n\n\
        Download an OAuth client (Desktop app) from\n\
        https://console.cloud.google.com/apis/credentials\n\
        and save it as that file."
    )]
    CredentialsNotFound(PathBuf),

    #[error("Invalid client credentials in {path}: {reason}")]
    InvalidCredentials { path: PathBuf, reason: String },

    #[error("Failed to parse token file {path}: {reason}")]
    TokenParse { path: PathBuf, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for calmeet core operations.
pub type CalmeetResult<T> = Result<T, CalmeetError>;
