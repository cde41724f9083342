//! Repository detection from git remotes

use crate::error::{Error, Result};
use crate::types::PlatformConfig;
use std::path::Path;
use url::Url;

/// Read the fetch URL of the `origin` remote of the repository at `path`
pub fn read_origin_url(path: &Path) -> Result<String> {
    let repo = gix::discover(path).map_err(|e| Error::Git(e.to_string()))?;
    let remote = repo
        .find_remote("origin")
        .map_err(|e| Error::Git(format!("no 'origin' remote: {e}")))?;
    let url = remote
        .url(gix::remote::Direction::Fetch)
        .ok_or_else(|| Error::Git("'origin' remote has no fetch URL".to_string()))?;
    Ok(url.to_bstring().to_string())
}

/// Name of the branch checked out in the repository at `path`
pub fn current_branch(path: &Path) -> Result<String> {
    let repo = gix::discover(path).map_err(|e| Error::Git(e.to_string()))?;
    let head = repo
        .head_name()
        .map_err(|e| Error::Git(e.to_string()))?
        .ok_or_else(|| Error::Git("HEAD is detached".to_string()))?;
    Ok(head.shorten().to_string())
}

/// Parse owner/repo/host from a remote URL
///
/// Accepts scp-like (`git@github.com:owner/repo.git`), `ssh://` and
/// `https://` URLs. Any host other than github.com is treated as GitHub
/// Enterprise.
pub fn parse_repo_info(remote_url: &str) -> Result<PlatformConfig> {
    let trimmed = remote_url.trim();
    let invalid = || Error::InvalidRemote(trimmed.to_string());

    let (host, path) = if let Ok(url) = Url::parse(trimmed) {
        let host = url.host_str().ok_or_else(invalid)?.to_string();
        (host, url.path().trim_start_matches('/').to_string())
    } else {
        // scp-like syntax: [user@]host:owner/repo
        let (user_host, path) = trimmed.split_once(':').ok_or_else(invalid)?;
        let host = user_host.rsplit('@').next().unwrap_or(user_host);
        (host.to_string(), path.to_string())
    };

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut parts = path.split('/');
    let (Some(owner), Some(repo), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    if owner.is_empty() || repo.is_empty() || host.is_empty() {
        return Err(invalid());
    }

    Ok(PlatformConfig {
        owner: owner.to_string(),
        repo: repo.to_string(),
        host: (host != "github.com").then_some(host),
    })
}
