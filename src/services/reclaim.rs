//! Environment reclaimer
//!
//! Best-effort teardown of everything in the deployment namespace. Every step
//! is guarded on its own; failures become warnings and the sequence goes on.

use tracing::{info, warn};

use crate::domain::DeploymentPlan;
use crate::infra::Invocation;

use super::context::LaunchContext;

/// What a reclaim pass removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReclaimReport {
    pub containers_removed: usize,
    pub networks_removed: usize,
    /// Steps that failed and were skipped over
    pub warnings: usize,
}

/// Tear down all containers and networks of the plan's namespace
pub async fn reclaim(ctx: &LaunchContext, plan: &DeploymentPlan) -> ReclaimReport {
    let mut report = ReclaimReport::default();
    let root = ctx.root_dir();
    let filter = plan.name_filter();
    ctx.log_stdout("Cleaning up Docker environment...");

    // a. compose down across both stacks
    if let Err(e) = ctx.run("docker", plan.down_args(), root).await {
        warning(ctx, &mut report, &format!("Error during compose down: {}", e));
    }

    // b. containers matching the namespace
    let list = Invocation::new("docker", ["ps", "-aq", "--filter", filter.as_str()], root);
    match ctx.run_quiet(&list).await {
        Ok(outcome) => {
            for container in outcome.stdout_lines() {
                let rm = Invocation::new("docker", ["rm", "-f", container.as_str()], root);
                match ctx.run_quiet(&rm).await {
                    Ok(_) => report.containers_removed += 1,
                    Err(e) => warning(
                        ctx,
                        &mut report,
                        &format!("Could not remove container {}: {}", container, e),
                    ),
                }
            }
        }
        Err(e) => warning(ctx, &mut report, &format!("Error listing containers: {}", e)),
    }

    // c. networks matching the namespace
    let list = Invocation::new(
        "docker",
        ["network", "ls", "--filter", filter.as_str(), "--format", "{{.ID}}"],
        root,
    );
    match ctx.run_quiet(&list).await {
        Ok(outcome) => {
            for network in outcome.stdout_lines() {
                let rm = Invocation::new("docker", ["network", "rm", "-f", network.as_str()], root);
                match ctx.run_quiet(&rm).await {
                    Ok(_) => report.networks_removed += 1,
                    Err(e) => warning(
                        ctx,
                        &mut report,
                        &format!("Could not remove network {}: {}", network, e),
                    ),
                }
            }
        }
        Err(e) => warning(ctx, &mut report, &format!("Error listing networks: {}", e)),
    }

    // d. the compose default network; usually already gone
    let default_network = plan.default_network();
    let rm = Invocation::new("docker", ["network", "rm", default_network.as_str()], root);
    if ctx.run_quiet(&rm).await.is_ok() {
        ctx.log_stdout(&format!("Removed network {}", default_network));
        report.networks_removed += 1;
        ctx.pause(ctx.config.delays.network_removal_settle).await;
    }

    // e.
    if let Err(e) = ctx.run("docker", ["network", "prune", "-f"], root).await {
        warning(ctx, &mut report, &format!("Error pruning networks: {}", e));
    }

    // f.
    ctx.log_stdout("Waiting for Docker resources to clean up...");
    ctx.pause(ctx.config.delays.reclaim_settle).await;

    info!(
        namespace = %plan.namespace,
        containers = report.containers_removed,
        networks = report.networks_removed,
        warnings = report.warnings,
        "Docker environment reclaimed"
    );
    report
}

fn warning(ctx: &LaunchContext, report: &mut ReclaimReport, message: &str) {
    report.warnings += 1;
    warn!("{}", message);
    ctx.log_stderr(&format!("Warning: {}", message));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Delays, LaunchConfig};
    use crate::domain::{CommandOutcome, Profile};
    use crate::infra::testing::ScriptedExecutor;
    use std::sync::Arc;

    fn setup() -> (LaunchContext, Arc<ScriptedExecutor>, DeploymentPlan) {
        let executor = Arc::new(ScriptedExecutor::new());
        let mut config = LaunchConfig::with_root("/srv/stack");
        config.delays = Delays::none();
        let plan = config.plan(Profile::Cpu);
        (LaunchContext::new(config, executor.clone()), executor, plan)
    }

    #[tokio::test]
    async fn test_empty_environment_is_clean() {
        let (ctx, executor, plan) = setup();
        // the default network does not exist
        executor.on(
            &["docker", "network", "rm", "localai_default"],
            CommandOutcome::failed(1, "Error: No such network: localai_default"),
        );

        let report = reclaim(&ctx, &plan).await;

        assert_eq!(report, ReclaimReport::default());
        assert_eq!(
            executor.commands(),
            vec![
                "docker compose -p localai -f docker-compose.yml -f supabase/docker/docker-compose.yml down --remove-orphans",
                "docker ps -aq --filter name=localai",
                "docker network ls --filter name=localai --format {{.ID}}",
                "docker network rm localai_default",
                "docker network prune -f",
            ]
        );
    }

    #[tokio::test]
    async fn test_removes_every_listed_resource() {
        let (ctx, executor, plan) = setup();
        executor.on(&["docker", "ps"], CommandOutcome::ok("c1\nc2\n\nc3\n"));
        executor.on(&["docker", "network", "ls"], CommandOutcome::ok("n1\nn2\n"));

        let report = reclaim(&ctx, &plan).await;

        for id in ["c1", "c2", "c3"] {
            assert_eq!(executor.count(&format!("docker rm -f {}", id)), 1);
        }
        for id in ["n1", "n2"] {
            assert_eq!(executor.count(&format!("docker network rm -f {}", id)), 1);
        }
        assert_eq!(report.containers_removed, 3);
        // n1, n2 and localai_default
        assert_eq!(report.networks_removed, 3);
        assert_eq!(report.warnings, 0);
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_sequence() {
        let (ctx, executor, plan) = setup();
        executor.on(&["docker", "compose"], CommandOutcome::failed(1, "no configuration file"));
        executor.on(&["docker", "ps"], CommandOutcome::ok("c1\nc2\n"));
        executor.on(&["docker", "rm", "-f", "c1"], CommandOutcome::failed(1, "conflict"));
        executor.on_missing(&["docker", "network", "ls"]);
        executor.on(&["docker", "network", "prune"], CommandOutcome::failed(1, "daemon busy"));

        let report = reclaim(&ctx, &plan).await;

        assert_eq!(report.containers_removed, 1);
        assert_eq!(report.warnings, 4);
        assert_eq!(executor.count("docker rm -f c2"), 1);
        assert_eq!(executor.count("docker network prune -f"), 1);
    }
}
