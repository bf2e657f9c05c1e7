//! Environment preparation
//!
//! Copies the root `.env` verbatim into the Supabase docker directory.

use tracing::info;

use crate::error::{LaunchError, LaunchResult};

use super::context::LaunchContext;

/// Copy the root `.env` over `<repo>/<sparse>/.env`, returning the byte count
pub async fn prepare(ctx: &LaunchContext) -> LaunchResult<u64> {
    let source = ctx.config.root_env_file();
    let target = ctx.config.target_env_file();

    match tokio::fs::try_exists(&source).await {
        Ok(true) => {}
        Ok(false) => {
            ctx.log_stderr(&format!("Error: {} file not found in root directory", source.display()));
            return Err(LaunchError::MissingEnvFile { path: source });
        }
        Err(e) => {
            ctx.log_stderr(&format!("Error: cannot access {}: {}", source.display(), e));
            return Err(LaunchError::EnvFileUnreadable { path: source, source: e });
        }
    }

    ctx.log_stdout(&format!(
        "Copying {} to {}...",
        source.display(),
        target.display()
    ));

    let bytes = tokio::fs::copy(&source, &target)
        .await
        .map_err(|e| LaunchError::EnvCopyFailed {
            from: source.clone(),
            to: target.clone(),
            source: e,
        })?;

    info!(bytes, target = %target.display(), "Environment file prepared");
    Ok(bytes)
}
