//! Platform services for GitHub
//!
//! Everything mergewatch reads from or writes to the hosted review system
//! goes through [`PlatformService`], so the watch loop can run against a
//! test double.

mod detection;
mod factory;
mod github;

pub use detection::{current_branch, parse_repo_info, read_origin_url};
pub use factory::create_platform_service;
pub use github::GitHubService;

use crate::error::Result;
use crate::types::{
    CombinedStatus, MergeMethod, MergeResult, PlatformConfig, PrComment, PullRequest, Review,
};
use async_trait::async_trait;

/// Platform service trait for PR operations
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Get a fresh snapshot of a PR
    async fn get_pull_request(&self, pr_number: u64) -> Result<PullRequest>;

    /// Find the open PR whose head is `head_branch`
    async fn find_open_pr_for_branch(&self, head_branch: &str) -> Result<Option<PullRequest>>;

    /// Get the combined commit status for a revision
    async fn get_combined_status(&self, sha: &str) -> Result<CombinedStatus>;

    /// List reviews recorded on a PR
    async fn list_reviews(&self, pr_number: u64) -> Result<Vec<Review>>;

    /// Submit an APPROVE review on a PR
    async fn approve_pr(&self, pr_number: u64) -> Result<()>;

    /// List one page of comments on a PR (pages start at 1)
    async fn list_pr_comments(
        &self,
        pr_number: u64,
        per_page: u8,
        page: u32,
    ) -> Result<Vec<PrComment>>;

    /// Create a comment on a PR
    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()>;

    /// Merge a PR
    ///
    /// `sha` pins the merge to the head revision the caller evaluated; the
    /// platform rejects the merge if the head has moved since.
    async fn merge_pr(
        &self,
        pr_number: u64,
        method: MergeMethod,
        commit_title: &str,
        sha: &str,
    ) -> Result<MergeResult>;

    /// Delete a branch reference
    async fn delete_branch(&self, branch: &str) -> Result<()>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}
