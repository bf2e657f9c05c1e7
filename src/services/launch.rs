//! Stack launcher
//!
//! Brings a compose stack up in detached mode under the plan's namespace,
//! retrying a bounded number of times.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::constants::LAUNCH_MAX_ATTEMPTS;
use crate::domain::{DeploymentPlan, StackSpec};
use crate::error::{LaunchError, LaunchResult};
use crate::infra::readiness::{ProbeResult, ReadinessProbe};

use super::context::LaunchContext;
use super::reclaim;

/// What to do between a failed attempt and the next one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Assume dirty state: run a full reclaim, then wait
    ReclaimThenWait(Duration),
    Wait(Duration),
}

/// Launch the dependency (Supabase) stack; failed attempts trigger a reclaim
pub async fn launch_dependency(ctx: &LaunchContext, plan: &DeploymentPlan) -> LaunchResult<u32> {
    let policy = RetryPolicy::ReclaimThenWait(ctx.config.delays.dependency_retry);
    launch_stack(ctx, plan, &plan.dependency, policy).await
}

/// Launch the primary (local AI) stack with its profile
pub async fn launch_primary(ctx: &LaunchContext, plan: &DeploymentPlan) -> LaunchResult<u32> {
    let policy = RetryPolicy::Wait(ctx.config.delays.primary_retry);
    launch_stack(ctx, plan, &plan.primary, policy).await
}

/// Run `docker compose ... up -d` until it succeeds or attempts run out.
///
/// Returns the number of attempts used.
pub async fn launch_stack(
    ctx: &LaunchContext,
    plan: &DeploymentPlan,
    stack: &StackSpec,
    policy: RetryPolicy,
) -> LaunchResult<u32> {
    ctx.log_stdout(&format!("Starting {} services...", stack.name));

    if let Some(path) = stack.missing_files(ctx.root_dir()).into_iter().next() {
        ctx.log_stderr(&format!("Error: Docker compose file not found: {}", path.display()));
        return Err(LaunchError::MissingComposeFile { path });
    }

    let args = stack.up_args(&plan.namespace);
    for attempt in 1..=LAUNCH_MAX_ATTEMPTS {
        match ctx.run("docker", args.iter().cloned(), ctx.root_dir()).await {
            Ok(_) => {
                ctx.log_stdout(&format!("{} services started successfully", stack.name));
                info!(stack = %stack.name, namespace = %plan.namespace, attempt, "Stack started");
                return Ok(attempt);
            }
            Err(e) => {
                ctx.log_stderr(&format!(
                    "Attempt {} failed to start {} services: {}",
                    attempt, stack.name, e
                ));
                warn!(stack = %stack.name, attempt, error = %e, "Compose up failed");
            }
        }

        if attempt < LAUNCH_MAX_ATTEMPTS {
            match policy {
                RetryPolicy::ReclaimThenWait(delay) => {
                    ctx.log_stdout("Cleaning up and retrying...");
                    reclaim::reclaim(ctx, plan).await;
                    ctx.pause(delay).await;
                }
                RetryPolicy::Wait(delay) => {
                    ctx.log_stdout(&format!(
                        "Waiting {} seconds before retry {}/{}...",
                        delay.as_secs(),
                        attempt + 1,
                        LAUNCH_MAX_ATTEMPTS
                    ));
                    ctx.pause(delay).await;
                }
            }
        }
    }

    error!(stack = %stack.name, "Giving up after {} attempts", LAUNCH_MAX_ATTEMPTS);
    Err(LaunchError::StackLaunchFailed {
        stack: stack.name.clone(),
        attempts: LAUNCH_MAX_ATTEMPTS,
    })
}

/// How the wait between the two stacks ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Fixed cooldown elapsed
    Waited(Duration),
    Ready { attempts: u32 },
    /// Probe gave up; the launch continues anyway
    ProbeTimedOut,
}

/// Give the dependency stack time to initialize before the primary stack.
///
/// Without a readiness URL this is a plain fixed sleep.
pub async fn wait_for_dependency(ctx: &LaunchContext, plan: &DeploymentPlan) -> GateOutcome {
    let readiness = &ctx.config.readiness;
    match &readiness.url {
        None => {
            let cooldown = ctx.config.delays.dependency_cooldown;
            ctx.log_stdout(&format!("Waiting for {} to initialize...", plan.dependency.name));
            ctx.pause(cooldown).await;
            GateOutcome::Waited(cooldown)
        }
        Some(url) => {
            ctx.log_stdout(&format!(
                "Waiting for {} to become ready at {}...",
                plan.dependency.name, url
            ));
            let probe = ReadinessProbe::new(url.as_str(), readiness.interval, readiness.timeout);
            match probe.wait_ready().await {
                ProbeResult::Ready { attempts, .. } => GateOutcome::Ready { attempts },
                ProbeResult::TimedOut { .. } => {
                    ctx.log_stderr(&format!(
                        "Warning: {} did not report ready within {}s, continuing",
                        plan.dependency.name,
                        readiness.timeout.as_secs()
                    ));
                    GateOutcome::ProbeTimedOut
                }
            }
        }
    }
}
