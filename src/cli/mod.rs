//! CLI command implementations

pub mod context;
pub mod status;
pub mod style;
pub mod watch;

use anstream::{eprintln, println};
use async_trait::async_trait;
use mergewatch::error::Error;
use mergewatch::progress::ProgressCallback;
use mergewatch::readiness::ReadinessReport;
use mergewatch::types::RunResult;
use style::{CHECK, Stylize, flag};

/// Progress callback printing to the terminal
pub struct CliProgress;

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_readiness(&self, report: &ReadinessReport) {
        println!(
            "{} checks={} qa_pass={} approved={}",
            "[watch]".muted(),
            flag(report.checks_green),
            flag(report.qa_approved),
            flag(report.review_approved)
        );
        if report.approval_issued {
            println!("  {}", "approved automatically".muted());
        }
        if !report.missing_contexts.is_empty() {
            println!(
                "  {} {}",
                "waiting on:".muted(),
                report.missing_contexts.join(", ").accent()
            );
        }
        for reason in &report.degraded {
            println!("  {} {}", "degraded:".warn(), reason.muted());
        }
    }

    async fn on_message(&self, message: &str) {
        println!("{message}");
    }

    async fn on_finished(&self, result: &RunResult) {
        match result {
            RunResult::MergedAndReleased(info) => {
                println!(
                    "{} Released {} → {}",
                    CHECK.success(),
                    info.version.accent(),
                    info.url
                );
            }
            RunResult::MergedReleaseFailed => {
                println!(
                    "{} Merged, but the release failed. Run the release manually.",
                    "⚠️".warn()
                );
            }
            RunResult::MergedExternally => {
                println!("{}", "Already merged.".muted());
            }
            RunResult::Pending => {}
        }
    }

    async fn on_error(&self, error: &Error) {
        eprintln!("{} {}", "poll error (continuing):".warn(), error.muted());
    }
}
