//! mergewatch CLI

mod cli;

use anstream::eprintln;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use cli::context::TargetOptions;
use cli::style::Stylize;
use mergewatch::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mergewatch")]
#[command(version)]
#[command(about = "Merge a GitHub pull request once checks, QA and review are green, then release")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the git repository
    #[arg(long, global = true, default_value = ".")]
    path: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the PR until it is merged and released (default)
    Watch(TargetArgs),
    /// Evaluate readiness once without approving or merging
    Status(TargetArgs),
}

#[derive(Args, Default)]
struct TargetArgs {
    /// PR number (overrides PR_NUMBER)
    #[arg(long)]
    pr: Option<u64>,

    /// Watch the open PR of the current branch
    #[arg(long, conflicts_with = "pr")]
    from_branch: bool,

    /// Config file (default: <config dir>/mergewatch/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl From<TargetArgs> for TargetOptions {
    fn from(args: TargetArgs) -> Self {
        Self {
            pr: args.pr,
            from_branch: args.from_branch,
            config_path: args.config,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Watch(TargetArgs::default())) {
        Commands::Watch(args) => {
            cli::watch::run_watch(&cli.path, &args.into())
                .await
                .context("watch failed")?;
        }
        Commands::Status(args) => {
            cli::status::run_status(&cli.path, &args.into())
                .await
                .context("status check failed")?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if matches!(err.downcast_ref::<Error>(), Some(Error::MissingToken)) => {
            // Not configured yet is not a failure for unattended schedulers
            warn!("no GitHub token, nothing to do");
            eprintln!(
                "{} Set a session token first, e.g. {}",
                "⚠️".warn(),
                "export GITHUB_TOKEN=<fine-grained token>".accent()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err:#}");
            eprintln!("{} {err:#}", "error:".warn());
            ExitCode::FAILURE
        }
    }
}
