//! Signal fetchers - read-only queries against the platform
//!
//! Only the PR snapshot itself is mandatory. The three readiness signals are
//! fetched independently and a failure degrades that one signal to its safe
//! default instead of aborting the tick.

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{CombinedStatus, PrComment, PullRequest, Review};
use tracing::{debug, warn};

/// Upper bound on comment pages fetched per tick
pub const MAX_COMMENT_PAGES: u32 = 50;

/// Outcome of one signal fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    /// Value as reported by the platform
    Fresh(T),
    /// Fetch failed; `fallback` is the safe default standing in for it
    Degraded {
        /// Safe default used in place of the real value
        fallback: T,
        /// Why the fetch failed
        reason: String,
    },
}

impl<T> Fetched<T> {
    /// Turn a fetch result into a signal, substituting `fallback` on error
    pub fn from_result(what: &str, result: Result<T>, fallback: impl FnOnce() -> T) -> Self {
        match result {
            Ok(value) => Self::Fresh(value),
            Err(e) => {
                warn!(signal = what, error = %e, "fetch failed, using safe default");
                Self::Degraded {
                    fallback: fallback(),
                    reason: format!("{what}: {e}"),
                }
            }
        }
    }

    /// The value to evaluate, fresh or fallback
    pub const fn value(&self) -> &T {
        match self {
            Self::Fresh(value) | Self::Degraded { fallback: value, .. } => value,
        }
    }

    /// Whether the fetch failed
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Failure reason, if degraded
    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            Self::Fresh(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }
}

/// Everything fetched for one tick
#[derive(Debug, Clone)]
pub struct SignalSnapshot {
    /// Fresh PR snapshot
    pub pr: PullRequest,
    /// Combined status for `pr.head_sha`
    pub status: Fetched<CombinedStatus>,
    /// Recorded reviews
    pub reviews: Fetched<Vec<Review>>,
    /// All comments
    pub comments: Fetched<Vec<PrComment>>,
}

impl SignalSnapshot {
    /// Reasons of every degraded signal
    pub fn degraded_reasons(&self) -> Vec<String> {
        [
            self.status.degraded_reason(),
            self.reviews.degraded_reason(),
            self.comments.degraded_reason(),
        ]
        .into_iter()
        .flatten()
        .map(ToString::to_string)
        .collect()
    }
}

/// Fetch the PR and all three signals
pub async fn fetch_signals(
    platform: &dyn PlatformService,
    pr_number: u64,
    comment_page_size: u8,
) -> Result<SignalSnapshot> {
    let pr = platform.get_pull_request(pr_number).await?;
    Ok(fetch_signals_for(platform, pr, comment_page_size).await)
}

/// Fetch the three signals for an already fetched PR snapshot
///
/// The combined status is always queried for the head SHA of `pr`, and a
/// response for any other revision is discarded.
pub async fn fetch_signals_for(
    platform: &dyn PlatformService,
    pr: PullRequest,
    comment_page_size: u8,
) -> SignalSnapshot {
    let head_sha = pr.head_sha.clone();

    let status_result = platform
        .get_combined_status(&head_sha)
        .await
        .and_then(|status| {
            if status.sha.is_empty() || status.sha == head_sha {
                Ok(status)
            } else {
                Err(Error::GitHubApi(format!(
                    "status belongs to {}, head is {head_sha}",
                    status.sha
                )))
            }
        });
    let status = Fetched::from_result("combined status", status_result, || {
        CombinedStatus::empty(head_sha.clone())
    });

    let reviews = Fetched::from_result(
        "reviews",
        platform.list_reviews(pr.number).await,
        Vec::new,
    );

    let comments = Fetched::from_result(
        "comments",
        list_all_comments(platform, pr.number, comment_page_size).await,
        Vec::new,
    );

    debug!(
        pr_number = pr.number,
        head_sha = %head_sha,
        statuses = status.value().statuses.len(),
        reviews = reviews.value().len(),
        comments = comments.value().len(),
        "fetched signals"
    );

    SignalSnapshot {
        pr,
        status,
        reviews,
        comments,
    }
}

/// List every comment on a PR, page by page
pub async fn list_all_comments(
    platform: &dyn PlatformService,
    pr_number: u64,
    page_size: u8,
) -> Result<Vec<PrComment>> {
    let mut all = Vec::new();

    for page in 1..=MAX_COMMENT_PAGES {
        let batch = platform
            .list_pr_comments(pr_number, page_size, page)
            .await?;
        let done = batch.len() < usize::from(page_size);
        all.extend(batch);
        if done {
            return Ok(all);
        }
    }

    warn!(
        pr_number,
        pages = MAX_COMMENT_PAGES,
        fetched = all.len(),
        "comment page limit reached, later comments are ignored"
    );
    Ok(all)
}
