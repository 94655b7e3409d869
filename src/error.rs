//! Error types for pr-doctor

use thiserror::Error;

/// Errors that can occur while diagnosing a pull request
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API call failed or returned an unexpected response
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Generic platform failure (used by alternate and mock platforms)
    #[error("platform error: {0}")]
    Platform(String),

    /// No usable credentials
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The pull request could not be resolved
    #[error("pull request not found: {0}")]
    PrNotFound(String),

    /// The repository identity could not be resolved
    #[error("could not resolve repository: {0}")]
    Repository(String),

    /// A git command failed
    #[error("git error: {0}")]
    Git(String),

    /// Configuration file could not be read or parsed
    #[error("config error: {0}")]
    Config(String),

    /// Error surfaced by octocrab
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias using the crate error type
pub type Result<T> = std::result::Result<T, Error>;
