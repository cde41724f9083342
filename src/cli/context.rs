//! Shared command context for CLI commands
//!
//! Extracts the setup shared by `watch` and `status`.

use mergewatch::auth::{get_approver_auth, get_github_auth};
use mergewatch::config::{FileConfig, WatchConfig};
use mergewatch::error::{Error, Result};
use mergewatch::platform::{
    PlatformService, create_platform_service, current_branch, parse_repo_info, read_origin_url,
};
use mergewatch::types::PlatformConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Which PR to watch and where the config lives
#[derive(Debug, Clone, Default)]
pub struct TargetOptions {
    /// Explicit PR number (overrides config and environment)
    pub pr: Option<u64>,
    /// Resolve the PR from the current branch
    pub from_branch: bool,
    /// Explicit config file
    pub config_path: Option<PathBuf>,
}

/// Shared context for CLI commands that interact with the platform
///
/// Resolution order matters: the token is checked first so an unconfigured
/// machine exits before touching git or the network.
pub struct CommandContext {
    /// Repository directory
    pub repo_path: PathBuf,
    /// Resolved configuration
    pub config: WatchConfig,
    /// Platform service used for reads, merges and comments
    pub platform: Box<dyn PlatformService>,
    /// Separate service for approvals, when `APPROVER_TOKEN` is set
    pub approver: Option<Box<dyn PlatformService>>,
}

impl CommandContext {
    /// Create a new command context
    ///
    /// - Resolve the token
    /// - Load config file and environment
    /// - Detect owner/repo from `origin` (or `GITHUB_REPOSITORY`)
    /// - Create platform services
    /// - Resolve the PR number
    pub async fn new(path: &Path, options: &TargetOptions) -> Result<Self> {
        let lookup = |key: &str| std::env::var(key).ok();

        let auth = get_github_auth(&lookup).await?;
        info!(length = auth.token.len(), source = ?auth.source, "token present");

        let file = FileConfig::load(options.config_path.as_deref())?;
        let mut config = WatchConfig::load(&lookup, file)?;

        let platform_config = match config.repository {
            Some(ref repo) => repository_from_slug(repo)?,
            None => parse_repo_info(&read_origin_url(path)?)?,
        };
        debug!(owner = %platform_config.owner, repo = %platform_config.repo, "detected repository");

        let platform = create_platform_service(&platform_config, &auth.token)?;

        let approver = get_approver_auth(&lookup)
            .map(|a| create_platform_service(&platform_config, &a.token))
            .transpose()?;

        if options.from_branch {
            let branch = current_branch(path)?;
            let pr = platform
                .find_open_pr_for_branch(&branch)
                .await?
                .ok_or_else(|| Error::Config(format!("no open PR found for branch '{branch}'")))?;
            config.pr_number = pr.number;
        } else if let Some(pr) = options.pr {
            config.pr_number = pr;
        }

        Ok(Self {
            repo_path: path.to_path_buf(),
            config,
            platform,
            approver,
        })
    }

    /// Service approvals go through
    pub fn approver(&self) -> &dyn PlatformService {
        self.approver
            .as_deref()
            .unwrap_or_else(|| self.platform.as_ref())
    }
}

/// Build a platform config from `owner/repo`
fn repository_from_slug(slug: &str) -> Result<PlatformConfig> {
    let (owner, repo) = slug.split_once('/').ok_or_else(|| {
        Error::Config(format!("repository must look like owner/repo, got '{slug}'"))
    })?;
    Ok(PlatformConfig {
        owner: owner.to_string(),
        repo: repo.to_string(),
        host: None,
    })
}
