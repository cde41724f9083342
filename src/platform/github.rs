//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    CombinedStatus, CommitStatus, MergeMethod, MergeResult, PlatformConfig, PrComment, PrState,
    PullRequest, Review, ReviewState, StatusState,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    /// Token for raw HTTP requests (combined status)
    token: String,
    /// HTTP client for raw requests (combined status)
    http_client: Client,
    /// API base URL for raw requests, without trailing slash
    api_base: String,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let api_base = host.as_ref().map_or_else(
            || "https://api.github.com".to_string(),
            |h| format!("https://{h}/api/v3"),
        );
        let config = PlatformConfig { owner, repo, host };
        Self::with_api_base(token, config, &api_base)
    }

    /// Create a service that talks to an explicit API base URL
    ///
    /// Used for GitHub Enterprise and for pointing the service at a local
    /// mock server in tests.
    pub fn with_api_base(token: &str, config: PlatformConfig, api_base: &str) -> Result<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();

        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if api_base != "https://api.github.com" {
            builder = builder
                .base_uri(api_base.as_str())
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }
        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("mergewatch")
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            token: token.to_string(),
            http_client,
            api_base,
        })
    }
}

/// Helper to convert octocrab PR to our `PullRequest` type
fn pr_from_octocrab(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    let merged = pr.merged.unwrap_or(false) || pr.merged_at.is_some();
    let state = match pr.state {
        _ if merged => PrState::Merged,
        Some(octocrab::models::IssueState::Open) => PrState::Open,
        // IssueState is non-exhaustive, so use wildcard for Closed and any future variants
        Some(_) | None => PrState::Closed,
    };

    PullRequest {
        number: pr.number,
        title: pr.title.clone().unwrap_or_default(),
        head_sha: pr.head.sha.clone(),
        head_ref: pr.head.ref_field.clone(),
        base_ref: pr.base.ref_field.clone(),
        state,
        merged,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
    }
}

fn review_state_from_octocrab(state: Option<&octocrab::models::pulls::ReviewState>) -> ReviewState {
    use octocrab::models::pulls::ReviewState as Gh;

    match state {
        Some(Gh::Approved) => ReviewState::Approved,
        Some(Gh::ChangesRequested) => ReviewState::ChangesRequested,
        Some(Gh::Commented) => ReviewState::Commented,
        Some(Gh::Dismissed) => ReviewState::Dismissed,
        Some(Gh::Pending) => ReviewState::Pending,
        #[allow(unreachable_patterns)]
        Some(_) | None => ReviewState::Other,
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn get_pull_request(&self, pr_number: u64) -> Result<PullRequest> {
        debug!(pr_number, "getting PR");
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .get(pr_number)
            .await?;

        let result = pr_from_octocrab(&pr);
        debug!(pr_number, head_sha = %result.head_sha, state = %result.state, "got PR");
        Ok(result)
    }

    async fn find_open_pr_for_branch(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        debug!(head_branch, "finding open PR for branch");
        let head = format!("{}:{}", &self.config.owner, head_branch);

        let prs = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .head(head)
            .state(octocrab::params::State::Open)
            .send()
            .await?;

        let result = prs.items.first().map(pr_from_octocrab);
        if let Some(ref pr) = result {
            debug!(pr_number = pr.number, "found open PR");
        } else {
            debug!("no open PR found");
        }
        Ok(result)
    }

    async fn get_combined_status(&self, sha: &str) -> Result<CombinedStatus> {
        #[derive(Deserialize)]
        struct RawCombinedStatus {
            sha: String,
            #[serde(default)]
            statuses: Vec<RawStatus>,
        }

        #[derive(Deserialize)]
        struct RawStatus {
            context: String,
            state: String,
        }

        debug!(sha, "getting combined status");
        let url = format!(
            "{}/repos/{}/{}/commits/{}/status",
            self.api_base, self.config.owner, self.config.repo, sha
        );

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to fetch combined status: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::GitHubApi(format!(
                "combined status returned {}",
                response.status()
            )));
        }

        let raw: RawCombinedStatus = response
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse combined status: {e}")))?;

        let status = CombinedStatus {
            sha: raw.sha,
            statuses: raw
                .statuses
                .into_iter()
                .map(|s| CommitStatus {
                    context: s.context,
                    state: StatusState::parse(&s.state),
                })
                .collect(),
        };
        debug!(sha, count = status.statuses.len(), "got combined status");
        Ok(status)
    }

    async fn list_reviews(&self, pr_number: u64) -> Result<Vec<Review>> {
        debug!(pr_number, "listing reviews");
        let reviews = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list_reviews(pr_number)
            .send()
            .await?;

        let result: Vec<Review> = reviews
            .items
            .iter()
            .map(|r| Review {
                id: r.id.0,
                author: r.user.as_ref().map(|u| u.login.clone()),
                state: review_state_from_octocrab(r.state.as_ref()),
            })
            .collect();
        debug!(pr_number, count = result.len(), "listed reviews");
        Ok(result)
    }

    async fn approve_pr(&self, pr_number: u64) -> Result<()> {
        debug!(pr_number, "approving PR");
        let route = format!(
            "/repos/{}/{}/pulls/{pr_number}/reviews",
            self.config.owner, self.config.repo
        );
        let _: serde_json::Value = self
            .client
            .post(route, Some(&serde_json::json!({ "event": "APPROVE" })))
            .await?;
        debug!(pr_number, "approved PR");
        Ok(())
    }

    async fn list_pr_comments(
        &self,
        pr_number: u64,
        per_page: u8,
        page: u32,
    ) -> Result<Vec<PrComment>> {
        debug!(pr_number, page, "listing PR comments");
        let comments = self
            .client
            .issues(&self.config.owner, &self.config.repo)
            .list_comments(pr_number)
            .per_page(per_page)
            .page(page)
            .send()
            .await?;

        let result: Vec<PrComment> = comments
            .items
            .into_iter()
            .map(|c| PrComment {
                id: c.id.0,
                body: c.body.unwrap_or_default(),
            })
            .collect();
        debug!(pr_number, page, count = result.len(), "listed PR comments");
        Ok(result)
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        debug!(pr_number, "creating PR comment");
        self.client
            .issues(&self.config.owner, &self.config.repo)
            .create_comment(pr_number, body)
            .await?;
        debug!(pr_number, "created PR comment");
        Ok(())
    }

    async fn merge_pr(
        &self,
        pr_number: u64,
        method: MergeMethod,
        commit_title: &str,
        sha: &str,
    ) -> Result<MergeResult> {
        debug!(pr_number, %method, sha, "merging PR");

        let octocrab_method = match method {
            MergeMethod::Squash => octocrab::params::pulls::MergeMethod::Squash,
            MergeMethod::Merge => octocrab::params::pulls::MergeMethod::Merge,
            MergeMethod::Rebase => octocrab::params::pulls::MergeMethod::Rebase,
        };

        let result = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .merge(pr_number)
            .method(octocrab_method)
            .title(commit_title)
            .sha(sha)
            .send()
            .await
            .map_err(|e| match e {
                // 405: not mergeable (blocked, conflicts); 409: head SHA moved
                octocrab::Error::GitHub { source, .. }
                    if matches!(source.status_code.as_u16(), 405 | 409) =>
                {
                    Error::MergeConflict {
                        pr: pr_number,
                        message: source.message,
                    }
                }
                other => Error::MergeFailed(other.to_string()),
            })?;

        let merge_result = MergeResult {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        };

        debug!(
            pr_number,
            merged = merge_result.merged,
            sha = ?merge_result.sha,
            "merge complete"
        );
        Ok(merge_result)
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "deleting branch");
        self.client
            .repos(&self.config.owner, &self.config.repo)
            .delete_ref(&octocrab::params::repos::Reference::Branch(
                branch.to_string(),
            ))
            .await?;
        debug!(branch, "deleted branch");
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
