//! Merge execution - effectful operations
//!
//! Merge first; only that step can fail the action. Branch cleanup and the
//! release run afterwards and never undo a successful merge.

use crate::config::WatchConfig;
use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::progress::ProgressCallback;
use crate::release::{ReleaseRunner, manual_release_comment, release_info, released_comment};
use crate::types::{PullRequest, RunResult};
use tracing::{info, warn};

/// Merge `pr`, clean up its branch and run the release (EFFECTFUL)
///
/// Returns [`RunResult::MergedExternally`] without touching anything when the
/// snapshot already reports merged. Errors only when the merge itself fails;
/// the caller is expected to re-evaluate on a fresh snapshot.
pub async fn execute_action(
    pr: &PullRequest,
    config: &WatchConfig,
    platform: &dyn PlatformService,
    release: &dyn ReleaseRunner,
    progress: &dyn ProgressCallback,
) -> Result<RunResult> {
    if pr.merged {
        info!(pr_number = pr.number, "already merged, nothing to do");
        return Ok(RunResult::MergedExternally);
    }

    // Step 1: merge (must succeed)
    progress
        .on_message(&format!("🔀 Merging PR #{}: {}", pr.number, pr.title))
        .await;

    let merge_result = platform
        .merge_pr(pr.number, config.merge_method, &pr.title, &pr.head_sha)
        .await?;

    if !merge_result.merged {
        return Err(Error::MergeFailed(
            merge_result
                .message
                .unwrap_or_else(|| format!("PR #{} was not merged", pr.number)),
        ));
    }

    let sha_display = merge_result.sha.as_deref().unwrap_or("(no sha)");
    info!(pr_number = pr.number, sha = sha_display, method = %config.merge_method, "merged");
    progress.on_message(&format!("✅ Merged: {sha_display}")).await;

    // Step 2: branch cleanup (best-effort)
    if config.delete_branch {
        match platform.delete_branch(&pr.head_ref).await {
            Ok(()) => {
                progress
                    .on_message(&format!("🧹 Deleted branch {}", pr.head_ref))
                    .await;
            }
            Err(e) => {
                warn!(branch = %pr.head_ref, error = %e, "failed to delete head branch");
            }
        }
    }

    // Step 3: release (best-effort, reported distinctly)
    progress.on_message("🏷️  Tagging & releasing…").await;
    let result = match release.run().await {
        Ok(()) => {
            let info = release_info(platform.config(), &config.release.version);
            post_comment(platform, pr.number, &released_comment(&info)).await;
            info!(version = %info.version, url = %info.url, "released");
            RunResult::MergedAndReleased(info)
        }
        Err(e) => {
            warn!(error = %e, "release failed after successful merge");
            post_comment(
                platform,
                pr.number,
                &manual_release_comment(&release.describe()),
            )
            .await;
            RunResult::MergedReleaseFailed
        }
    };

    Ok(result)
}

/// Post a comment, logging instead of failing
async fn post_comment(platform: &dyn PlatformService, pr_number: u64, body: &str) {
    if let Err(e) = platform.create_pr_comment(pr_number, body).await {
        warn!(pr_number, error = %e, "failed to post comment");
    }
}
