//! Core types for mergewatch

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// A pull request snapshot, re-fetched on every tick
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// PR title (used as the merge commit title)
    pub title: String,
    /// Head commit SHA; changes on every push
    pub head_sha: String,
    /// Head branch name
    pub head_ref: String,
    /// Base branch name
    pub base_ref: String,
    /// Current state of the PR
    pub state: PrState,
    /// Whether the PR has been merged (never reverts)
    pub merged: bool,
    /// Web URL for the PR
    pub html_url: String,
}

impl PullRequest {
    /// `head → base`, as shown to users
    pub fn branches(&self) -> String {
        format!("{} → {}", self.head_ref, self.base_ref)
    }
}

/// PR state (open, closed, merged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrState {
    /// PR is open
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// State of a single commit status context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusState {
    /// Check passed
    Success,
    /// Check failed
    Failure,
    /// Check errored
    Error,
    /// Check still running
    Pending,
    /// Anything GitHub reports that we don't recognise
    Unknown,
}

impl StatusState {
    /// Parse a GitHub status state string (case-insensitive)
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "failure" => Self::Failure,
            "error" => Self::Error,
            "pending" => Self::Pending,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for StatusState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
            Self::Error => write!(f, "error"),
            Self::Pending => write!(f, "pending"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One named check result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    /// Context name (e.g. "CI")
    pub context: String,
    /// Reported state
    pub state: StatusState,
}

impl CommitStatus {
    /// Convenience constructor
    pub fn new(context: impl Into<String>, state: StatusState) -> Self {
        Self {
            context: context.into(),
            state,
        }
    }
}

/// Combined status snapshot for exactly one commit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedStatus {
    /// Commit SHA this snapshot belongs to
    pub sha: String,
    /// Individual statuses, most recent first
    pub statuses: Vec<CommitStatus>,
}

impl CombinedStatus {
    /// An empty snapshot for `sha` (no statuses present)
    pub fn empty(sha: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            statuses: Vec::new(),
        }
    }

    /// State of `context`, taking the most recent entry when listed twice
    pub fn state_of(&self, context: &str) -> Option<StatusState> {
        self.statuses
            .iter()
            .find(|s| s.context == context)
            .map(|s| s.state)
    }
}

/// Review state as reported by GitHub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewState {
    /// Reviewer approved
    Approved,
    /// Reviewer requested changes
    ChangesRequested,
    /// Comment-only review
    Commented,
    /// Review was dismissed
    Dismissed,
    /// Review not yet submitted
    Pending,
    /// Unrecognised state
    Other,
}

/// A recorded review on a PR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review ID
    pub id: u64,
    /// Reviewer login, if known
    pub author: Option<String>,
    /// Review state
    pub state: ReviewState,
}

/// A comment on a pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrComment {
    /// Comment ID
    pub id: u64,
    /// Comment body text
    pub body: String,
}

/// Platform configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}

impl PlatformConfig {
    /// Web URL of the repository
    pub fn web_url(&self) -> String {
        let host = self.host.as_deref().unwrap_or("github.com");
        format!("https://{host}/{}/{}", self.owner, self.repo)
    }

    /// Web URL of the release page for `tag`
    pub fn release_url(&self, tag: &str) -> String {
        format!("{}/releases/tag/{tag}", self.web_url())
    }
}

/// Result of a merge operation
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// Whether the merge was successful
    pub merged: bool,
    /// The SHA of the merge commit (if successful)
    pub sha: Option<String>,
    /// Message from the merge operation (especially on failure)
    pub message: Option<String>,
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Squash all commits into one
    #[default]
    Squash,
    /// Create a merge commit
    Merge,
    /// Rebase commits onto base branch
    Rebase,
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Squash => write!(f, "squash"),
            Self::Merge => write!(f, "merge"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

impl FromStr for MergeMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "squash" => Ok(Self::Squash),
            "merge" => Ok(Self::Merge),
            "rebase" => Ok(Self::Rebase),
            other => Err(Error::Config(format!(
                "unknown merge method '{other}' (expected merge, squash or rebase)"
            ))),
        }
    }
}

/// A published release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// Release tag (e.g. "v0.10.0")
    pub version: String,
    /// Web URL of the release
    pub url: String,
}

/// Outcome of a watch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResult {
    /// Not ready yet, keep polling
    Pending,
    /// We merged the PR and the release succeeded
    MergedAndReleased(ReleaseInfo),
    /// We merged the PR but the release procedure failed
    MergedReleaseFailed,
    /// The PR was already merged when we looked (by a human or an earlier run)
    MergedExternally,
}

impl RunResult {
    /// Whether the watch loop must stop
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for RunResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::MergedAndReleased(info) => write!(f, "merged and released {}", info.version),
            Self::MergedReleaseFailed => write!(f, "merged, release failed"),
            Self::MergedExternally => write!(f, "already merged"),
        }
    }
}
