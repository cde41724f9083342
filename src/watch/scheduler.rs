//! Poll scheduler
//!
//! An explicit state machine: `Initializing` runs one tick immediately,
//! `Polling` ticks once per [`Ticker::wait`], `Terminated` is final. Every
//! tick starts from a fresh PR snapshot; nothing carries over between ticks
//! except the tick counter and the last readiness report.

use crate::config::WatchConfig;
use crate::error::Result;
use crate::merge::execute_action;
use crate::platform::PlatformService;
use crate::progress::ProgressCallback;
use crate::readiness::{QaPattern, ReadinessReport, evaluate_readiness, fetch_signals_for};
use crate::release::ReleaseRunner;
use crate::types::RunResult;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Scheduler state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchState {
    /// No tick has run yet
    Initializing,
    /// At least one tick ran and the PR is not merged
    Polling,
    /// Terminal result reached; no further ticks
    Terminated(RunResult),
}

/// How a watch run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// Reached a terminal result
    Finished(RunResult),
    /// Ticker was cancelled before a terminal result
    Cancelled {
        /// Ticks performed before cancellation
        ticks: u64,
    },
}

/// Source of time between ticks
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick; `false` means stop watching
    async fn wait(&mut self) -> bool;
}

/// Sleeps for a fixed interval; Ctrl-C cancels
///
/// The interrupt is latched: a Ctrl-C received while a tick is running
/// stops the watch at the next wait.
pub struct IntervalTicker {
    interval: Duration,
    interrupted: watch::Receiver<bool>,
}

impl IntervalTicker {
    /// Create a ticker firing every `interval`, cancelled by Ctrl-C
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(interval: Duration) -> Self {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    let _ = tx.send(true);
                }
                Err(e) => warn!(error = %e, "cannot listen for Ctrl-C"),
            }
        });
        Self::with_interrupt(interval, rx)
    }

    /// Create a ticker cancelled once `interrupted` becomes `true`
    pub const fn with_interrupt(interval: Duration, interrupted: watch::Receiver<bool>) -> Self {
        Self {
            interval,
            interrupted,
        }
    }
}

/// Resolves once the flag is set; never if its sender is gone unset
async fn interrupt_raised(flag: &mut watch::Receiver<bool>) {
    if flag.wait_for(|&raised| raised).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn wait(&mut self) -> bool {
        tokio::select! {
            biased;
            () = interrupt_raised(&mut self.interrupted) => {
                info!("interrupted, stopping watch");
                false
            }
            () = tokio::time::sleep(self.interval) => true,
        }
    }
}

/// Watches one PR until it is merged
pub struct Watcher<'a> {
    config: &'a WatchConfig,
    platform: &'a dyn PlatformService,
    approver: &'a dyn PlatformService,
    release: &'a dyn ReleaseRunner,
    progress: &'a dyn ProgressCallback,
    qa_pattern: QaPattern,
    state: WatchState,
    ticks: u64,
    last_report: Option<ReadinessReport>,
}

impl<'a> Watcher<'a> {
    /// Create a watcher; approvals are issued through `platform`
    pub fn new(
        config: &'a WatchConfig,
        platform: &'a dyn PlatformService,
        release: &'a dyn ReleaseRunner,
        progress: &'a dyn ProgressCallback,
    ) -> Self {
        Self {
            config,
            platform,
            approver: platform,
            release,
            progress,
            qa_pattern: QaPattern::default(),
            state: WatchState::Initializing,
            ticks: 0,
            last_report: None,
        }
    }

    /// Issue auto-approvals through a different principal
    #[must_use]
    pub fn with_approver(mut self, approver: &'a dyn PlatformService) -> Self {
        self.approver = approver;
        self
    }

    /// Use a custom QA acceptance pattern
    #[must_use]
    pub fn with_qa_pattern(mut self, pattern: QaPattern) -> Self {
        self.qa_pattern = pattern;
        self
    }

    /// Current state
    pub const fn state(&self) -> &WatchState {
        &self.state
    }

    /// Ticks performed so far
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Readiness report of the most recent evaluation
    pub const fn last_report(&self) -> Option<&ReadinessReport> {
        self.last_report.as_ref()
    }

    /// Perform one transition
    ///
    /// A no-op once terminated. Tick failures are reported and leave the
    /// watcher polling.
    pub async fn step(&mut self) -> &WatchState {
        if matches!(self.state, WatchState::Terminated(_)) {
            return &self.state;
        }

        self.ticks += 1;
        self.state = match self.tick().await {
            Ok(result) if !result.is_terminal() => WatchState::Polling,
            Ok(result) => {
                info!(ticks = self.ticks, %result, "watch finished");
                self.progress.on_finished(&result).await;
                WatchState::Terminated(result)
            }
            Err(e) => {
                if e.is_transient() {
                    warn!(tick = self.ticks, error = %e, "tick failed, will retry");
                } else {
                    error!(tick = self.ticks, error = %e, "tick failed, will retry");
                }
                self.progress.on_error(&e).await;
                WatchState::Polling
            }
        };
        &self.state
    }

    /// Tick until terminal or until the ticker cancels
    pub async fn run(&mut self, ticker: &mut dyn Ticker) -> WatchOutcome {
        info!(
            pr_number = self.config.pr_number,
            checks = ?self.config.required_checks,
            "watching PR"
        );

        loop {
            if let WatchState::Terminated(result) = self.step().await {
                return WatchOutcome::Finished(result.clone());
            }
            if !ticker.wait().await {
                return WatchOutcome::Cancelled { ticks: self.ticks };
            }
        }
    }

    async fn tick(&mut self) -> Result<RunResult> {
        let pr = self.platform.get_pull_request(self.config.pr_number).await?;
        if pr.merged {
            info!(pr_number = pr.number, "already merged");
            return Ok(RunResult::MergedExternally);
        }

        let snapshot =
            fetch_signals_for(self.platform, pr, self.config.comment_page_size).await;
        let approver = self.config.auto_approve.then_some(self.approver);
        let report =
            evaluate_readiness(&snapshot, self.config, &self.qa_pattern, approver).await;

        debug!(tick = self.ticks, head_sha = %report.head_sha, "readiness: {}", report.summary());
        self.progress.on_readiness(&report).await;
        let ready = report.ready();
        self.last_report = Some(report);

        if !ready {
            return Ok(RunResult::Pending);
        }

        execute_action(
            &snapshot.pr,
            self.config,
            self.platform,
            self.release,
            self.progress,
        )
        .await
    }
}
