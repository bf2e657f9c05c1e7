//! Prerequisite checks
//!
//! Verifies that docker, the compose plugin and git can be invoked before any
//! other side effect happens. A missing tool is never retried.

use tracing::info;

use crate::error::{LaunchError, LaunchResult};
use crate::infra::Invocation;

use super::context::{LaunchContext, StepError};

/// A required external tool and the version query that proves it works
pub struct RequiredTool {
    pub name: &'static str,
    pub program: &'static str,
    pub version_args: &'static [&'static str],
}

pub const REQUIRED_TOOLS: &[RequiredTool] = &[
    RequiredTool {
        name: "Docker",
        program: "docker",
        version_args: &["--version"],
    },
    RequiredTool {
        name: "Docker Compose",
        program: "docker",
        version_args: &["compose", "version"],
    },
    RequiredTool {
        name: "Git",
        program: "git",
        version_args: &["--version"],
    },
];

/// Run the version query of every required tool, stopping at the first failure
pub async fn check(ctx: &LaunchContext) -> LaunchResult<()> {
    for tool in REQUIRED_TOOLS {
        let invocation = Invocation::new(
            tool.program,
            tool.version_args.iter().copied(),
            ctx.root_dir(),
        );
        ctx.log_stdout(&format!("Running: {}", invocation));

        match ctx.run_quiet(&invocation).await {
            Ok(outcome) => {
                info!(tool = tool.name, version = %outcome.stdout.trim(), "Prerequisite available");
            }
            Err(e) => {
                let reason = match &e {
                    StepError::Command(_) => format!(
                        "{} (please ensure Docker, Docker Compose, and Git are installed and in your PATH)",
                        e
                    ),
                    StepError::Exit(_) => format!("`{}` failed: {}", invocation, e),
                };
                ctx.log_stderr("Error: Prerequisites check failed");
                return Err(LaunchError::MissingTool {
                    tool: tool.name.to_string(),
                    reason,
                });
            }
        }
    }

    Ok(())
}
