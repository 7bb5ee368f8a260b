//! Error types shared by the application layer.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for configuration and application plumbing.
#[derive(Error, Debug)]
pub enum Error {
    /// Window creation or management errors
    #[error("Window error: {0}")]
    Window(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config error in {path}: {message}")]
    Config {
        /// File the error came from
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using the core Error type.
pub type Result<T> = std::result::Result<T, Error>;
