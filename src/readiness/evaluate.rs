//! Readiness evaluation
//!
//! The three predicates are pure and unit-tested on their own.
//! [`evaluate_readiness`] combines them and performs the one side effect of
//! this stage: issuing an approval when none exists yet.

use crate::config::WatchConfig;
use crate::platform::PlatformService;
use crate::readiness::signals::SignalSnapshot;
use crate::types::{CombinedStatus, PrComment, Review, ReviewState, StatusState};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{info, warn};

/// Acceptance phrase posted by QA
pub const DEFAULT_QA_PATTERN: &str = r"(?i)qa:\s*pass";

static DEFAULT_QA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_QA_PATTERN).expect("QA pattern is a valid regex"));

/// Matcher for the QA sentinel comment
#[derive(Debug, Clone)]
pub struct QaPattern(Regex);

impl QaPattern {
    /// Compile a custom pattern
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    /// Whether `body` contains the acceptance phrase
    pub fn is_match(&self, body: &str) -> bool {
        self.0.is_match(body)
    }
}

impl Default for QaPattern {
    fn default() -> Self {
        Self(DEFAULT_QA_REGEX.clone())
    }
}

/// Required contexts that are absent or not `success`
pub fn missing_contexts(status: &CombinedStatus, required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|ctx| status.state_of(ctx) != Some(StatusState::Success))
        .cloned()
        .collect()
}

/// Every required context reports `success`
///
/// An empty status list is never green, even with nothing required.
pub fn checks_green(status: &CombinedStatus, required: &[String]) -> bool {
    !status.statuses.is_empty() && missing_contexts(status, required).is_empty()
}

/// Some comment carries the QA acceptance phrase
pub fn qa_approved(comments: &[PrComment], pattern: &QaPattern) -> bool {
    comments.iter().any(|c| pattern.is_match(&c.body))
}

/// Some review is APPROVED
pub fn review_approved(reviews: &[Review]) -> bool {
    reviews.iter().any(|r| r.state == ReviewState::Approved)
}

/// Why a tick did or did not act
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ReadinessReport {
    /// PR number
    pub pr_number: u64,
    /// Head SHA the evaluation applies to
    pub head_sha: String,
    /// All required checks are green
    pub checks_green: bool,
    /// QA sentinel comment present
    pub qa_approved: bool,
    /// An approval exists (or was issued this tick)
    pub review_approved: bool,
    /// We issued the approval during this tick
    pub approval_issued: bool,
    /// Required contexts that are absent or not green
    pub missing_contexts: Vec<String>,
    /// Signals that fell back to their safe default
    pub degraded: Vec<String>,
}

impl ReadinessReport {
    /// Strict AND of the three signals
    pub const fn ready(&self) -> bool {
        self.checks_green && self.qa_approved && self.review_approved
    }

    /// One-line diagnostic
    pub fn summary(&self) -> String {
        format!(
            "checks={}  qa_pass={}  approved={}",
            self.checks_green, self.qa_approved, self.review_approved
        )
    }
}

/// Evaluate a snapshot
///
/// All three signals are computed every time. When the reviews were listed,
/// none is an approval, `config.auto_approve` is set and an `approver` is
/// given, an APPROVE review is submitted and counted for this tick; if that
/// fails the review signal stays false. Never fails.
pub async fn evaluate_readiness(
    snapshot: &SignalSnapshot,
    config: &WatchConfig,
    pattern: &QaPattern,
    approver: Option<&dyn PlatformService>,
) -> ReadinessReport {
    let status = snapshot.status.value();
    let checks = checks_green(status, &config.required_checks);
    let missing = missing_contexts(status, &config.required_checks);
    let qa = qa_approved(snapshot.comments.value(), pattern);
    let mut approved = review_approved(snapshot.reviews.value());
    let mut approval_issued = false;

    // Reviews that could not be listed count as not approved
    if !approved
        && !snapshot.reviews.is_degraded()
        && config.auto_approve
        && let Some(approver) = approver
    {
        match approver.approve_pr(snapshot.pr.number).await {
            Ok(()) => {
                info!(pr_number = snapshot.pr.number, "submitted approval");
                approved = true;
                approval_issued = true;
            }
            Err(e) => {
                warn!(pr_number = snapshot.pr.number, error = %e, "auto-approval failed");
            }
        }
    }

    ReadinessReport {
        pr_number: snapshot.pr.number,
        head_sha: snapshot.pr.head_sha.clone(),
        checks_green: checks,
        qa_approved: qa,
        review_approved: approved,
        approval_issued,
        missing_contexts: missing,
        degraded: snapshot.degraded_reasons(),
    }
}
