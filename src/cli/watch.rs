//! Watch command - poll the PR until it is merged and released

use crate::cli::CliProgress;
use crate::cli::context::{CommandContext, TargetOptions};
use crate::cli::style::Stylize;
use anstream::println;
use mergewatch::error::Result;
use mergewatch::release::CommandRelease;
use mergewatch::watch::{IntervalTicker, WatchOutcome, Watcher};
use std::path::Path;

/// Run the watch command
pub async fn run_watch(path: &Path, options: &TargetOptions) -> Result<WatchOutcome> {
    let ctx = CommandContext::new(path, options).await?;
    let config = &ctx.config;

    println!(
        "Watching PR {} for CI=[{}] + {}…",
        format!("#{}", config.pr_number).accent(),
        config.required_checks.join(", "),
        "\"QA: PASS\"".emphasis()
    );

    let release = CommandRelease::new(&config.release).in_dir(&ctx.repo_path);
    let progress = CliProgress;
    let mut watcher = Watcher::new(config, ctx.platform.as_ref(), &release, &progress)
        .with_approver(ctx.approver());
    let mut ticker = IntervalTicker::new(config.poll_interval);

    let outcome = watcher.run(&mut ticker).await;

    if let WatchOutcome::Cancelled { ticks } = outcome {
        println!(
            "{}",
            format!("Stopped after {ticks} tick(s); PR not merged.").muted()
        );
    }

    Ok(outcome)
}
