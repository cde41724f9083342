//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::MockPlatformService;

use async_trait::async_trait;
use mergewatch::config::WatchConfig;
use mergewatch::error::{Error, Result};
use mergewatch::progress::ProgressCallback;
use mergewatch::readiness::ReadinessReport;
use mergewatch::release::ReleaseRunner;
use mergewatch::types::{
    CombinedStatus, CommitStatus, PlatformConfig, PrState, PullRequest, RunResult, StatusState,
};
use mergewatch::watch::Ticker;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Platform config for github.com/acme/recorder
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        owner: "acme".to_string(),
        repo: "recorder".to_string(),
        host: None,
    }
}

/// Open PR with the given head
pub fn make_pr(number: u64, title: &str, head_ref: &str, head_sha: &str) -> PullRequest {
    PullRequest {
        number,
        title: title.to_string(),
        head_sha: head_sha.to_string(),
        head_ref: head_ref.to_string(),
        base_ref: "main".to_string(),
        state: PrState::Open,
        merged: false,
        html_url: format!("https://github.com/acme/recorder/pull/{number}"),
    }
}

/// Combined status for `sha` with the given contexts
pub fn status_for(sha: &str, entries: &[(&str, StatusState)]) -> CombinedStatus {
    CombinedStatus {
        sha: sha.to_string(),
        statuses: entries
            .iter()
            .map(|(ctx, state)| CommitStatus::new(*ctx, *state))
            .collect(),
    }
}

/// Both default required checks green
pub fn green_status(sha: &str) -> CombinedStatus {
    status_for(
        sha,
        &[
            ("CI", StatusState::Success),
            ("Secret Scan", StatusState::Success),
        ],
    )
}

/// Default config watching PR #3
pub fn watch_config() -> WatchConfig {
    WatchConfig::default()
}

/// Mock platform holding PR #3 on `feat/recorder` at `abc123`
pub fn platform_with_pr() -> MockPlatformService {
    let platform = MockPlatformService::with_config(github_config());
    platform.set_pull_request(make_pr(3, "Add recorder", "feat/recorder", "abc123"));
    platform
}

/// Release runner with a scripted outcome
pub struct MockRelease {
    succeed: bool,
    calls: AtomicUsize,
}

impl MockRelease {
    /// Release that always succeeds
    pub fn succeeding() -> Self {
        Self {
            succeed: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Release that always fails
    pub fn failing() -> Self {
        Self {
            succeed: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `run` was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseRunner for MockRelease {
    async fn run(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            Ok(())
        } else {
            Err(Error::Release("exit status: 1".to_string()))
        }
    }

    fn describe(&self) -> String {
        "bash scripts/tag_and_release_v0100.sh".to_string()
    }
}

/// Ticker that allows a fixed number of waits, then cancels
pub struct ScriptedTicker {
    remaining: usize,
    waits: usize,
}

impl ScriptedTicker {
    /// Allow `ticks` waits before cancelling
    pub const fn new(ticks: usize) -> Self {
        Self {
            remaining: ticks,
            waits: 0,
        }
    }

    /// Number of times `wait` was called
    pub const fn waits(&self) -> usize {
        self.waits
    }
}

#[async_trait]
impl Ticker for ScriptedTicker {
    async fn wait(&mut self) -> bool {
        self.waits += 1;
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Progress callback recording what it was told
#[derive(Default)]
pub struct RecordingProgress {
    reports: Mutex<Vec<ReadinessReport>>,
    messages: Mutex<Vec<String>>,
    finished: Mutex<Vec<RunResult>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn reports(&self) -> Vec<ReadinessReport> {
        self.reports.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn finished(&self) -> Vec<RunResult> {
        self.finished.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_readiness(&self, report: &ReadinessReport) {
        self.reports.lock().unwrap().push(report.clone());
    }

    async fn on_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    async fn on_finished(&self, result: &RunResult) {
        self.finished.lock().unwrap().push(result.clone());
    }

    async fn on_error(&self, error: &Error) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}
