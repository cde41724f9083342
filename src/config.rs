//! Watch configuration
//!
//! Built once at startup from defaults, an optional TOML file and the
//! environment (in that order of precedence, lowest first), then passed by
//! reference to every component.

use crate::error::{Error, Result};
use crate::types::MergeMethod;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// PR watched when nothing else is configured
pub const DEFAULT_PR_NUMBER: u64 = 3;

/// Required status contexts when nothing else is configured
pub const DEFAULT_REQUIRED_CHECKS: [&str; 2] = ["CI", "Secret Scan"];

/// Poll interval when nothing else is configured
pub const DEFAULT_POLL_MS: u64 = 45_000;

/// Release procedure when nothing else is configured
pub const DEFAULT_RELEASE_COMMAND: &str = "bash scripts/tag_and_release_v0100.sh";

/// Release tag when nothing else is configured
pub const DEFAULT_RELEASE_VERSION: &str = "v0.10.0";

/// GitHub's maximum page size for comment listings
pub const DEFAULT_COMMENT_PAGE_SIZE: u8 = 100;

/// Directory name under the user config dir
const CONFIG_DIR: &str = "mergewatch";

/// Config filename
const CONFIG_FILE: &str = "config.toml";

/// How to cut a release after merging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    /// Program and arguments of the release procedure
    pub command: Vec<String>,
    /// Tag the procedure publishes
    pub version: String,
}

/// Everything the watch loop needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// PR to watch
    pub pr_number: u64,
    /// Status contexts that must all be `success`
    pub required_checks: Vec<String>,
    /// Approve the PR automatically when no approval exists
    pub auto_approve: bool,
    /// Merge method
    pub merge_method: MergeMethod,
    /// Time between ticks
    pub poll_interval: Duration,
    /// Delete the head branch after merging
    pub delete_branch: bool,
    /// Release procedure
    pub release: ReleaseConfig,
    /// Page size when listing comments
    pub comment_page_size: u8,
    /// `owner/repo` override for remote detection
    pub repository: Option<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            pr_number: DEFAULT_PR_NUMBER,
            required_checks: DEFAULT_REQUIRED_CHECKS
                .iter()
                .map(ToString::to_string)
                .collect(),
            auto_approve: true,
            merge_method: MergeMethod::Squash,
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            delete_branch: true,
            release: ReleaseConfig {
                command: split_command(DEFAULT_RELEASE_COMMAND),
                version: DEFAULT_RELEASE_VERSION.to_string(),
            },
            comment_page_size: DEFAULT_COMMENT_PAGE_SIZE,
            repository: None,
        }
    }
}

/// On-disk configuration; every key is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// PR to watch
    pub pr_number: Option<u64>,
    /// Required status contexts
    pub required_checks: Option<Vec<String>>,
    /// Auto-approve toggle
    pub auto_approve: Option<bool>,
    /// Merge method
    pub merge_method: Option<MergeMethod>,
    /// Poll interval in milliseconds
    pub poll_ms: Option<u64>,
    /// Branch deletion toggle
    pub delete_branch: Option<bool>,
    /// Release command line
    pub release_command: Option<String>,
    /// Release tag
    pub release_version: Option<String>,
    /// Comment page size
    pub comment_page_size: Option<u8>,
    /// `owner/repo` override
    pub repository: Option<String>,
}

impl FileConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load the config file
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if present, and `None` is returned otherwise.
    pub fn load(path: Option<&Path>) -> Result<Option<Self>> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(None),
            },
        };

        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        let file: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;
        Ok(Some(file))
    }
}

/// Split a command line on whitespace
fn split_command(line: &str) -> Vec<String> {
    line.split_whitespace().map(ToString::to_string).collect()
}

/// Parse a comma-separated context list, dropping blanks
pub fn parse_check_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// `true` (any case) means on, anything else means off
fn parse_flag(raw: &str) -> bool {
    raw.trim().eq_ignore_ascii_case("true")
}

fn parse_number<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{var} must be a number, got '{raw}'")))
}

impl WatchConfig {
    /// Build the config from an optional file and an environment lookup
    ///
    /// The lookup is injected so callers (and tests) decide where variables
    /// come from; `main` passes `std::env::var`.
    pub fn load(lookup: &dyn Fn(&str) -> Option<String>, file: Option<FileConfig>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(file) = file {
            config.apply_file(file);
        }
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: FileConfig) {
        if let Some(n) = file.pr_number {
            self.pr_number = n;
        }
        if let Some(checks) = file.required_checks {
            self.required_checks = checks
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect();
        }
        if let Some(flag) = file.auto_approve {
            self.auto_approve = flag;
        }
        if let Some(method) = file.merge_method {
            self.merge_method = method;
        }
        if let Some(ms) = file.poll_ms {
            self.poll_interval = Duration::from_millis(ms);
        }
        if let Some(flag) = file.delete_branch {
            self.delete_branch = flag;
        }
        if let Some(cmd) = file.release_command {
            self.release.command = split_command(&cmd);
        }
        if let Some(version) = file.release_version {
            self.release.version = version;
        }
        if let Some(size) = file.comment_page_size {
            self.comment_page_size = size;
        }
        if file.repository.is_some() {
            self.repository = file.repository;
        }
    }

    fn apply_env(&mut self, lookup: &dyn Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup("PR_NUMBER") {
            self.pr_number = parse_number("PR_NUMBER", &raw)?;
        }
        if let Some(raw) = lookup("REQUIRED_CHECKS") {
            self.required_checks = parse_check_list(&raw);
        }
        if let Some(raw) = lookup("AUTO_APPROVE") {
            self.auto_approve = parse_flag(&raw);
        }
        if let Some(raw) = lookup("MERGE_METHOD") {
            self.merge_method = raw.parse()?;
        }
        if let Some(raw) = lookup("POLL_MS") {
            self.poll_interval = Duration::from_millis(parse_number("POLL_MS", &raw)?);
        }
        if let Some(raw) = lookup("DELETE_BRANCH") {
            self.delete_branch = parse_flag(&raw);
        }
        if let Some(raw) = lookup("RELEASE_COMMAND") {
            self.release.command = split_command(&raw);
        }
        if let Some(raw) = lookup("RELEASE_VERSION") {
            self.release.version = raw.trim().to_string();
        }
        if let Some(raw) = lookup("GITHUB_REPOSITORY") {
            let raw = raw.trim();
            if !raw.is_empty() {
                self.repository = Some(raw.to_string());
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.required_checks.is_empty() {
            return Err(Error::Config(
                "at least one required check context must be configured".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::Config("poll interval must be positive".to_string()));
        }
        if self.release.command.is_empty() {
            return Err(Error::Config("release command is empty".to_string()));
        }
        if self.release.version.is_empty() {
            return Err(Error::Config("release version is empty".to_string()));
        }
        if self.comment_page_size == 0 {
            return Err(Error::Config("comment page size must be positive".to_string()));
        }
        if let Some(ref repo) = self.repository
            && repo.split('/').filter(|p| !p.is_empty()).count() != 2
        {
            return Err(Error::Config(format!(
                "repository must look like owner/repo, got '{repo}'"
            )));
        }
        Ok(())
    }
}
