//! Release collaborator
//!
//! The release procedure is an external command whose only contract is its
//! exit status. Output is captured for logs and never parsed.

use crate::config::ReleaseConfig;
use crate::error::{Error, Result};
use crate::types::{PlatformConfig, ReleaseInfo};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs the tag-and-publish procedure
#[async_trait]
pub trait ReleaseRunner: Send + Sync {
    /// Run the release; `Ok` iff it succeeded
    async fn run(&self) -> Result<()>;

    /// Human-readable command, used in the manual-release instruction
    fn describe(&self) -> String;
}

/// Release by running a local command
pub struct CommandRelease {
    command: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandRelease {
    /// Create a runner for `config`
    pub fn new(config: &ReleaseConfig) -> Self {
        Self {
            command: config.command.clone(),
            working_dir: None,
        }
    }

    /// Run the command from `dir` instead of the current directory
    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}

#[async_trait]
impl ReleaseRunner for CommandRelease {
    async fn run(&self) -> Result<()> {
        let Some((exe, args)) = self.command.split_first() else {
            return Err(Error::Release("release command is empty".to_string()));
        };

        debug!(command = %self.describe(), "running release");
        let mut cmd = Command::new(exe);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .await
            .map_err(|e| Error::Release(format!("failed to start `{}`: {e}", self.describe())))?;

        debug!(
            stdout = %String::from_utf8_lossy(&output.stdout),
            stderr = %String::from_utf8_lossy(&output.stderr),
            "release output"
        );

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::Release(format!(
                "`{}` exited with {}",
                self.describe(),
                output.status
            )))
        }
    }

    fn describe(&self) -> String {
        self.command.join(" ")
    }
}

/// Release info for `version` in the repository described by `platform`
pub fn release_info(platform: &PlatformConfig, version: &str) -> ReleaseInfo {
    ReleaseInfo {
        version: version.to_string(),
        url: platform.release_url(version),
    }
}

/// Comment posted after a successful merge and release
pub fn released_comment(info: &ReleaseInfo) -> String {
    format!("✅ Merged & released **{}** → {}", info.version, info.url)
}

/// Comment posted when the merge succeeded but the release did not
pub fn manual_release_comment(command: &str) -> String {
    format!("⚠️ Merge done, but release script failed. Run `{command}` manually.")
}
