//! GitHub token discovery

use super::AuthSource;
use crate::error::{Error, Result};
use tokio::process::Command;
use tracing::debug;

/// Environment variables checked for a token, in order
const TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Environment variable for a separate approving principal
const APPROVER_TOKEN_VAR: &str = "APPROVER_TOKEN";

/// A resolved GitHub token
#[derive(Clone)]
pub struct GitHubAuthConfig {
    /// The token itself
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
}

impl std::fmt::Debug for GitHubAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAuthConfig")
            .field("token", &format_args!("<{} chars>", self.token.len()))
            .field("source", &self.source)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve the GitHub token
///
/// Checks `GITHUB_TOKEN`, then `GH_TOKEN`, then falls back to
/// `gh auth token`. Returns [`Error::MissingToken`] when none is available.
pub async fn get_github_auth(lookup: &dyn Fn(&str) -> Option<String>) -> Result<GitHubAuthConfig> {
    for var in TOKEN_VARS {
        if let Some(token) = non_empty(lookup(var)) {
            debug!(var, len = token.len(), "using token from environment");
            return Ok(GitHubAuthConfig {
                token,
                source: AuthSource::EnvVar,
            });
        }
    }

    match gh_cli_token().await {
        Some(token) => {
            debug!(len = token.len(), "using token from gh CLI");
            Ok(GitHubAuthConfig {
                token,
                source: AuthSource::Cli,
            })
        }
        None => Err(Error::MissingToken),
    }
}

/// Resolve the optional token used to issue approvals
///
/// GitHub does not allow a principal to approve its own pull request, so
/// auto-approval can be delegated to a second account.
pub fn get_approver_auth(lookup: &dyn Fn(&str) -> Option<String>) -> Option<GitHubAuthConfig> {
    non_empty(lookup(APPROVER_TOKEN_VAR)).map(|token| GitHubAuthConfig {
        token,
        source: AuthSource::EnvVar,
    })
}

async fn gh_cli_token() -> Option<String> {
    let output = Command::new("gh")
        .args(["auth", "token"])
        .output()
        .await
        .ok()?;

    if !output.status.success() {
        debug!("gh auth token failed");
        return None;
    }

    non_empty(String::from_utf8(output.stdout).ok())
}
