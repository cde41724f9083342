//! Mock platform service for testing
//!
//! These are test utilities - not all may be used by every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use mergewatch::error::{Error, Result};
use mergewatch::platform::PlatformService;
use mergewatch::types::{
    CombinedStatus, MergeMethod, MergeResult, PlatformConfig, PrComment, PrState, PullRequest,
    Review, ReviewState,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `merge_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePrCall {
    pub pr_number: u64,
    pub method: MergeMethod,
    pub title: String,
    pub sha: String,
}

/// Call record for `create_pr_comment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCommentCall {
    pub pr_number: u64,
    pub body: String,
}

/// Call record for `list_pr_comments`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCommentsCall {
    pub pr_number: u64,
    pub per_page: u8,
    pub page: u32,
}

/// Injected merge failure
#[derive(Debug, Clone)]
enum MergeFailure {
    Conflict(String),
    Other(String),
}

/// Simple mock platform service for testing
///
/// This manually implements `PlatformService` rather than using mockall,
/// because mockall has issues with methods returning references.
///
/// Behaves like a tiny GitHub: approving records an APPROVED review and a
/// successful merge flips the stored PR to merged, so a following tick sees
/// the effects.
pub struct MockPlatformService {
    config: PlatformConfig,
    next_review_id: AtomicU64,
    pull_request: Mutex<Option<PullRequest>>,
    statuses: Mutex<HashMap<String, CombinedStatus>>,
    reviews: Mutex<Vec<Review>>,
    comments: Mutex<Vec<PrComment>>,
    open_prs_by_branch: Mutex<HashMap<String, PullRequest>>,
    merge_response: Mutex<Option<MergeResult>>,
    // Call tracking
    get_pr_calls: Mutex<Vec<u64>>,
    status_calls: Mutex<Vec<String>>,
    list_reviews_calls: Mutex<Vec<u64>>,
    approve_calls: Mutex<Vec<u64>>,
    list_comments_calls: Mutex<Vec<ListCommentsCall>>,
    create_comment_calls: Mutex<Vec<CreateCommentCall>>,
    merge_pr_calls: Mutex<Vec<MergePrCall>>,
    delete_branch_calls: Mutex<Vec<String>>,
    // Error injection
    error_on_get_pr: Mutex<Option<String>>,
    error_on_status: Mutex<Option<String>>,
    error_on_reviews: Mutex<Option<String>>,
    error_on_comments: Mutex<Option<String>>,
    error_on_approve: Mutex<Option<String>>,
    error_on_create_comment: Mutex<Option<String>>,
    error_on_delete_branch: Mutex<Option<String>>,
    error_on_merge: Mutex<Option<MergeFailure>>,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            next_review_id: AtomicU64::new(1000),
            pull_request: Mutex::new(None),
            statuses: Mutex::new(HashMap::new()),
            reviews: Mutex::new(Vec::new()),
            comments: Mutex::new(Vec::new()),
            open_prs_by_branch: Mutex::new(HashMap::new()),
            merge_response: Mutex::new(None),
            get_pr_calls: Mutex::new(Vec::new()),
            status_calls: Mutex::new(Vec::new()),
            list_reviews_calls: Mutex::new(Vec::new()),
            approve_calls: Mutex::new(Vec::new()),
            list_comments_calls: Mutex::new(Vec::new()),
            create_comment_calls: Mutex::new(Vec::new()),
            merge_pr_calls: Mutex::new(Vec::new()),
            delete_branch_calls: Mutex::new(Vec::new()),
            error_on_get_pr: Mutex::new(None),
            error_on_status: Mutex::new(None),
            error_on_reviews: Mutex::new(None),
            error_on_comments: Mutex::new(None),
            error_on_approve: Mutex::new(None),
            error_on_create_comment: Mutex::new(None),
            error_on_delete_branch: Mutex::new(None),
            error_on_merge: Mutex::new(None),
        }
    }

    // === Response setup ===

    /// Set the PR returned by `get_pull_request`
    pub fn set_pull_request(&self, pr: PullRequest) {
        *self.pull_request.lock().unwrap() = Some(pr);
    }

    /// Current stored PR
    pub fn pull_request(&self) -> Option<PullRequest> {
        self.pull_request.lock().unwrap().clone()
    }

    /// Set the combined status for a SHA
    pub fn set_status(&self, status: CombinedStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(status.sha.clone(), status);
    }

    /// Set the combined status returned for `sha`, regardless of its own SHA
    pub fn set_status_for(&self, sha: &str, status: CombinedStatus) {
        self.statuses.lock().unwrap().insert(sha.to_string(), status);
    }

    /// Add a recorded review
    pub fn add_review(&self, state: ReviewState) {
        let id = self.next_review_id.fetch_add(1, Ordering::SeqCst);
        self.reviews.lock().unwrap().push(Review {
            id,
            author: Some("reviewer".to_string()),
            state,
        });
    }

    /// Add a comment
    pub fn add_comment(&self, body: &str) {
        let mut comments = self.comments.lock().unwrap();
        let id = comments.len() as u64 + 1;
        comments.push(PrComment {
            id,
            body: body.to_string(),
        });
    }

    /// Register the open PR for a branch
    pub fn set_open_pr_for_branch(&self, branch: &str, pr: PullRequest) {
        self.open_prs_by_branch
            .lock()
            .unwrap()
            .insert(branch.to_string(), pr);
    }

    /// Override the merge response (default: merged)
    pub fn set_merge_response(&self, result: MergeResult) {
        *self.merge_response.lock().unwrap() = Some(result);
    }

    // === Error injection methods ===

    /// Make `get_pull_request` return an error
    pub fn fail_get_pr(&self, msg: &str) {
        *self.error_on_get_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `get_pull_request` succeed again
    pub fn clear_get_pr_failure(&self) {
        *self.error_on_get_pr.lock().unwrap() = None;
    }

    /// Make `get_combined_status` return an error
    pub fn fail_status(&self, msg: &str) {
        *self.error_on_status.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_reviews` return an error
    pub fn fail_reviews(&self, msg: &str) {
        *self.error_on_reviews.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_reviews` succeed again
    pub fn clear_reviews_failure(&self) {
        *self.error_on_reviews.lock().unwrap() = None;
    }

    /// Make `list_pr_comments` return an error
    pub fn fail_comments(&self, msg: &str) {
        *self.error_on_comments.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `approve_pr` return an error
    pub fn fail_approve(&self, msg: &str) {
        *self.error_on_approve.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pr_comment` return an error
    pub fn fail_create_comment(&self, msg: &str) {
        *self.error_on_create_comment.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `delete_branch` return an error
    pub fn fail_delete_branch(&self, msg: &str) {
        *self.error_on_delete_branch.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge_pr` fail with a merge conflict
    pub fn fail_merge_with_conflict(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(MergeFailure::Conflict(msg.to_string()));
    }

    /// Make `merge_pr` fail with a generic error
    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(MergeFailure::Other(msg.to_string()));
    }

    /// Make `merge_pr` succeed again
    pub fn clear_merge_failure(&self) {
        *self.error_on_merge.lock().unwrap() = None;
    }

    // === Call verification methods ===

    /// Get all `get_pull_request` calls
    pub fn get_pr_calls(&self) -> Vec<u64> {
        self.get_pr_calls.lock().unwrap().clone()
    }

    /// Get all SHAs `get_combined_status` was called with
    pub fn get_status_calls(&self) -> Vec<String> {
        self.status_calls.lock().unwrap().clone()
    }

    /// Get all `list_reviews` calls
    pub fn get_list_reviews_calls(&self) -> Vec<u64> {
        self.list_reviews_calls.lock().unwrap().clone()
    }

    /// Get all `approve_pr` calls
    pub fn get_approve_calls(&self) -> Vec<u64> {
        self.approve_calls.lock().unwrap().clone()
    }

    /// Get all `list_pr_comments` calls
    pub fn get_list_comments_calls(&self) -> Vec<ListCommentsCall> {
        self.list_comments_calls.lock().unwrap().clone()
    }

    /// Get all `create_pr_comment` calls
    pub fn get_create_comment_calls(&self) -> Vec<CreateCommentCall> {
        self.create_comment_calls.lock().unwrap().clone()
    }

    /// Get all `merge_pr` calls
    pub fn get_merge_pr_calls(&self) -> Vec<MergePrCall> {
        self.merge_pr_calls.lock().unwrap().clone()
    }

    /// Get all `delete_branch` calls
    pub fn get_delete_branch_calls(&self) -> Vec<String> {
        self.delete_branch_calls.lock().unwrap().clone()
    }

    /// Get count of `merge_pr` calls
    pub fn merge_call_count(&self) -> usize {
        self.merge_pr_calls.lock().unwrap().len()
    }

    /// Assert that `merge_pr` was NOT called
    pub fn assert_merge_not_called(&self) {
        let calls = self.get_merge_pr_calls();
        assert!(
            calls.is_empty(),
            "Expected merge_pr NOT to be called but it was: {calls:?}"
        );
    }

    /// Assert that a comment containing `needle` was posted
    pub fn assert_comment_contains(&self, needle: &str) {
        let calls = self.get_create_comment_calls();
        assert!(
            calls.iter().any(|c| c.body.contains(needle)),
            "Expected a comment containing {needle:?} but got: {calls:?}"
        );
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn get_pull_request(&self, pr_number: u64) -> Result<PullRequest> {
        self.get_pr_calls.lock().unwrap().push(pr_number);

        // Check for injected error
        if let Some(msg) = self.error_on_get_pr.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        self.pull_request
            .lock()
            .unwrap()
            .clone()
            .filter(|pr| pr.number == pr_number)
            .ok_or_else(|| {
                Error::Platform(format!(
                    "get_pull_request: no response configured for PR #{pr_number}"
                ))
            })
    }

    async fn find_open_pr_for_branch(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        Ok(self
            .open_prs_by_branch
            .lock()
            .unwrap()
            .get(head_branch)
            .cloned())
    }

    async fn get_combined_status(&self, sha: &str) -> Result<CombinedStatus> {
        self.status_calls.lock().unwrap().push(sha.to_string());

        if let Some(msg) = self.error_on_status.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(sha)
            .cloned()
            .unwrap_or_else(|| CombinedStatus::empty(sha)))
    }

    async fn list_reviews(&self, pr_number: u64) -> Result<Vec<Review>> {
        self.list_reviews_calls.lock().unwrap().push(pr_number);

        if let Some(msg) = self.error_on_reviews.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        Ok(self.reviews.lock().unwrap().clone())
    }

    async fn approve_pr(&self, pr_number: u64) -> Result<()> {
        self.approve_calls.lock().unwrap().push(pr_number);

        if let Some(msg) = self.error_on_approve.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        self.add_review(ReviewState::Approved);
        Ok(())
    }

    async fn list_pr_comments(
        &self,
        pr_number: u64,
        per_page: u8,
        page: u32,
    ) -> Result<Vec<PrComment>> {
        self.list_comments_calls
            .lock()
            .unwrap()
            .push(ListCommentsCall {
                pr_number,
                per_page,
                page,
            });

        if let Some(msg) = self.error_on_comments.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        let per_page = usize::from(per_page);
        let skip = (page as usize - 1) * per_page;
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .skip(skip)
            .take(per_page)
            .cloned()
            .collect())
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        self.create_comment_calls
            .lock()
            .unwrap()
            .push(CreateCommentCall {
                pr_number,
                body: body.to_string(),
            });

        if let Some(msg) = self.error_on_create_comment.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }
        Ok(())
    }

    async fn merge_pr(
        &self,
        pr_number: u64,
        method: MergeMethod,
        commit_title: &str,
        sha: &str,
    ) -> Result<MergeResult> {
        self.merge_pr_calls.lock().unwrap().push(MergePrCall {
            pr_number,
            method,
            title: commit_title.to_string(),
            sha: sha.to_string(),
        });

        // Check for injected error
        match self.error_on_merge.lock().unwrap().clone() {
            Some(MergeFailure::Conflict(message)) => {
                return Err(Error::MergeConflict {
                    pr: pr_number,
                    message,
                });
            }
            Some(MergeFailure::Other(msg)) => return Err(Error::MergeFailed(msg)),
            None => {}
        }

        let result = self
            .merge_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| MergeResult {
                merged: true,
                sha: Some(format!("merged_sha_{pr_number}")),
                message: None,
            });

        if result.merged
            && let Some(pr) = self.pull_request.lock().unwrap().as_mut()
        {
            pr.merged = true;
            pr.state = PrState::Merged;
        }

        Ok(result)
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        self.delete_branch_calls
            .lock()
            .unwrap()
            .push(branch.to_string());

        if let Some(msg) = self.error_on_delete_branch.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
