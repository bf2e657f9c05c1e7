//! Repository fetcher
//!
//! Keeps a sparse checkout of the Supabase repository (only its `docker/`
//! directory) next to the root compose file.

use std::path::Path;

use tracing::{info, warn};

use crate::config::constants::GIT_MAX_ATTEMPTS;
use crate::error::{LaunchError, LaunchResult};
use crate::infra::Invocation;

use super::context::LaunchContext;

/// How the fetch stage ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Fresh sparse clone
    Cloned,
    /// Existing checkout pulled
    Updated,
    /// Git failed on every attempt but the sparse directory is on disk
    Degraded,
}

/// Result of a single retried git step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GitStep {
    Done,
    Degraded,
}

/// Clone the repository if it is missing, otherwise update it
pub async fn fetch(ctx: &LaunchContext) -> LaunchResult<FetchOutcome> {
    let repo_dir = ctx.config.repo_dir();
    let repo = &ctx.config.repo;

    if !repo_dir.exists() {
        ctx.log_stdout(&format!("Cloning the {} repository...", repo.dir_name));

        let steps: [(Vec<&str>, &Path); 4] = [
            (
                vec!["clone", "--filter=blob:none", "--no-checkout", repo.url.as_str()],
                ctx.root_dir(),
            ),
            (vec!["sparse-checkout", "init", "--cone"], repo_dir.as_path()),
            (vec!["sparse-checkout", "set", repo.sparse_dir.as_str()], repo_dir.as_path()),
            (vec!["checkout", repo.branch.as_str()], repo_dir.as_path()),
        ];

        let mut degraded = false;
        for (args, cwd) in steps {
            if git_with_retry(ctx, &args, cwd).await? == GitStep::Degraded {
                degraded = true;
            }
        }

        Ok(if degraded {
            FetchOutcome::Degraded
        } else {
            FetchOutcome::Cloned
        })
    } else {
        ctx.log_stdout(&format!(
            "{} repository already exists, updating...",
            repo.dir_name
        ));

        match pull_with_relaxed_tls(ctx, &repo_dir).await? {
            GitStep::Done => Ok(FetchOutcome::Updated),
            GitStep::Degraded => Ok(FetchOutcome::Degraded),
        }
    }
}

/// Run one git command with the fixed-delay retry policy
async fn git_with_retry(ctx: &LaunchContext, args: &[&str], cwd: &Path) -> LaunchResult<GitStep> {
    let invocation = Invocation::new("git", args.iter().copied(), cwd).streamed();
    ctx.log_stdout(&format!("Running: {}", invocation));

    let mut last_error = String::new();
    for attempt in 1..=GIT_MAX_ATTEMPTS {
        match ctx.run_quiet(&invocation).await {
            Ok(_) => return Ok(GitStep::Done),
            Err(e) => {
                ctx.log_stderr(&format!("Attempt {} failed: {}", attempt, e));
                warn!(command = %invocation, attempt, error = %e, "Git command failed");
                last_error = e.to_string();
            }
        }

        if attempt < GIT_MAX_ATTEMPTS {
            retry_pause(ctx).await;
        }
    }

    exhausted(ctx, &invocation, last_error)
}

/// `git pull` with `http.sslVerify` turned off for the duration of each attempt
async fn pull_with_relaxed_tls(ctx: &LaunchContext, repo_dir: &Path) -> LaunchResult<GitStep> {
    let pull = Invocation::new("git", ["pull"], repo_dir).streamed();
    ctx.log_stdout(&format!("Running: {}", pull));

    let mut last_error = String::new();
    for attempt in 1..=GIT_MAX_ATTEMPTS {
        set_ssl_verify(ctx, repo_dir, false).await;
        let result = ctx.run_quiet(&pull).await;
        set_ssl_verify(ctx, repo_dir, true).await;

        match result {
            Ok(_) => return Ok(GitStep::Done),
            Err(e) => {
                ctx.log_stderr(&format!("Attempt {} failed: {}", attempt, e));
                warn!(command = %pull, attempt, error = %e, "Git pull failed");
                last_error = e.to_string();
            }
        }

        if attempt < GIT_MAX_ATTEMPTS {
            retry_pause(ctx).await;
        }
    }

    exhausted(ctx, &pull, last_error)
}

async fn set_ssl_verify(ctx: &LaunchContext, cwd: &Path, enabled: bool) {
    let value = if enabled { "true" } else { "false" };
    let invocation = Invocation::new(
        "git",
        ["config", "--global", "http.sslVerify", value],
        cwd,
    );
    if let Err(e) = ctx.run_quiet(&invocation).await {
        warn!(value, error = %e, "Failed to set http.sslVerify");
        if enabled {
            ctx.log_stderr(&format!(
                "Warning: could not restore http.sslVerify=true: {}",
                e
            ));
        }
    }
}

async fn retry_pause(ctx: &LaunchContext) {
    let delay = ctx.config.delays.git_retry;
    ctx.log_stdout(&format!("Retrying in {} seconds...", delay.as_secs()));
    ctx.pause(delay).await;
}

/// All attempts failed: accept a stale checkout, refuse a missing one
fn exhausted(ctx: &LaunchContext, invocation: &Invocation, detail: String) -> LaunchResult<GitStep> {
    let sparse_path = ctx.config.sparse_path();
    if sparse_path.is_dir() {
        ctx.log_stderr("Git operation failed but required files exist. Continuing...");
        info!(path = %sparse_path.display(), "Using existing checkout");
        return Ok(GitStep::Degraded);
    }

    ctx.log_stderr("All retry attempts failed.");
    Err(LaunchError::GitFailed {
        command: invocation.to_string(),
        attempts: GIT_MAX_ATTEMPTS,
        detail,
    })
}
