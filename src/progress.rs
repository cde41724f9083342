//! Progress reporting for human-facing output
//!
//! The library logs through `tracing`; this trait is the separate channel the
//! CLI uses to print what is happening as it happens.

use crate::readiness::ReadinessReport;
use crate::types::RunResult;
use async_trait::async_trait;

/// Receives progress updates from the watch loop and the action executor
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called after every evaluation
    async fn on_readiness(&self, report: &ReadinessReport);

    /// Called with a free-form status message
    async fn on_message(&self, message: &str);

    /// Called once when the run reaches a terminal result
    async fn on_finished(&self, result: &RunResult);

    /// Called when a tick fails and the loop will retry
    async fn on_error(&self, error: &crate::error::Error);
}

/// Progress callback that discards everything
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_readiness(&self, _report: &ReadinessReport) {}

    async fn on_message(&self, _message: &str) {}

    async fn on_finished(&self, _result: &RunResult) {}

    async fn on_error(&self, _error: &crate::error::Error) {}
}
