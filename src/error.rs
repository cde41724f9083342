//! Error types for mergewatch

use thiserror::Error;

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by mergewatch
#[derive(Debug, Error)]
pub enum Error {
    /// No GitHub token could be found
    #[error("no GitHub token found (set GITHUB_TOKEN or GH_TOKEN, or log in with `gh auth login`)")]
    MissingToken,

    /// Invalid or inconsistent configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Remote URL could not be parsed into owner/repo
    #[error("cannot parse owner/repo from remote URL: {0}")]
    InvalidRemote(String),

    /// Git repository could not be read
    #[error("git error: {0}")]
    Git(String),

    /// GitHub API request failed
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Generic platform failure (used by test doubles and non-HTTP failures)
    #[error("platform error: {0}")]
    Platform(String),

    /// Merge was rejected because the head moved or the PR is not mergeable
    #[error("merge conflict on PR #{pr}: {message}")]
    MergeConflict {
        /// PR number
        pr: u64,
        /// Message returned by the platform
        message: String,
    },

    /// Merge request failed for any other reason
    #[error("merge failed: {0}")]
    MergeFailed(String),

    /// Release procedure failed
    #[error("release failed: {0}")]
    Release(String),
}

impl Error {
    /// Whether the watch loop should keep polling after this error.
    ///
    /// Missing credentials and configuration problems will not fix
    /// themselves between ticks; everything else might.
    pub const fn is_transient(&self) -> bool {
        !matches!(self, Self::MissingToken | Self::Config(_) | Self::InvalidRemote(_))
    }
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}
