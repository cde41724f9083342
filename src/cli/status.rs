//! Status command - evaluate readiness once without acting

use crate::cli::context::{CommandContext, TargetOptions};
use crate::cli::style::{Stylize, flag};
use anstream::println;
use mergewatch::error::Result;
use mergewatch::readiness::{QaPattern, evaluate_readiness, fetch_signals_for};
use std::path::Path;

/// Run the status command
///
/// Read-only: no approval is issued and nothing is merged.
pub async fn run_status(path: &Path, options: &TargetOptions) -> Result<()> {
    let ctx = CommandContext::new(path, options).await?;
    let config = &ctx.config;

    let pr = ctx.platform.get_pull_request(config.pr_number).await?;
    println!(
        "{} {}",
        format!("PR #{}:", pr.number).emphasis(),
        pr.title
    );
    println!("  {} {}", "State:".muted(), pr.state);
    println!("  {} {}", "Branches:".muted(), pr.branches().accent());
    println!("  {} {}", "URL:".muted(), pr.html_url);

    if pr.merged {
        println!("{}", "Already merged.".muted());
        return Ok(());
    }

    let snapshot = fetch_signals_for(ctx.platform.as_ref(), pr, config.comment_page_size).await;
    let report = evaluate_readiness(&snapshot, config, &QaPattern::default(), None).await;

    println!("  {} {}", "Checks green:".muted(), flag(report.checks_green));
    for ctx_name in &report.missing_contexts {
        let state = snapshot
            .status
            .value()
            .state_of(ctx_name)
            .map_or_else(|| "missing".to_string(), |s| s.to_string());
        println!("    - {} ({})", ctx_name.accent(), state.warn());
    }
    println!("  {} {}", "QA pass:".muted(), flag(report.qa_approved));
    println!("  {} {}", "Approved:".muted(), flag(report.review_approved));
    for reason in &report.degraded {
        println!("  {} {}", "degraded:".warn(), reason.muted());
    }

    println!();
    if report.ready() {
        println!("{}", "Ready to merge.".success());
    } else {
        println!("{}", "Not ready to merge.".muted());
    }

    Ok(())
}
