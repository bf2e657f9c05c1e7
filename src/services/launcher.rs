//! Launch sequence
//!
//! prerequisites → fetch → prepare env → reclaim → dependency stack →
//! cooldown → primary stack. Stages run strictly one after another; the first
//! fatal error stops the run and the remaining stages are reported as skipped.

use tracing::{error, info};

use crate::config::constants::{SERVICE_ENDPOINTS, VERSION};
use crate::domain::{Profile, StageRecord, StageStatus};
use crate::error::LaunchResult;

use super::context::LaunchContext;
use super::fetch::{self, FetchOutcome};
use super::launch::{self, GateOutcome};
use super::reclaim::{self, ReclaimReport};
use super::{env_prep, prereq};

const PREREQUISITES: usize = 0;
const FETCH: usize = 1;
const PREPARE_ENV: usize = 2;
const RECLAIM: usize = 3;
const LAUNCH_DEPENDENCY: usize = 4;
const DEPENDENCY_GATE: usize = 5;
const LAUNCH_PRIMARY: usize = 6;

/// Summary of a successful run
#[derive(Debug, Clone)]
pub struct LaunchReport {
    pub profile: Profile,
    pub fetch: FetchOutcome,
    pub reclaim: ReclaimReport,
    pub dependency_attempts: u32,
    pub gate: GateOutcome,
    pub primary_attempts: u32,
    pub stages: Vec<StageRecord>,
}

fn new_stages() -> Vec<StageRecord> {
    vec![
        StageRecord::new("prerequisites", "Check Prerequisites"),
        StageRecord::new("fetch_repository", "Fetch Repository"),
        StageRecord::new("prepare_env", "Prepare Environment"),
        StageRecord::new("reclaim", "Reclaim Docker Environment"),
        StageRecord::new("launch_dependency", "Launch Supabase"),
        StageRecord::new("dependency_gate", "Wait for Supabase"),
        StageRecord::new("launch_primary", "Launch local AI"),
    ]
}

/// Run the whole launch sequence for `profile`
pub async fn run(ctx: &LaunchContext, profile: Profile) -> LaunchResult<LaunchReport> {
    info!(version = VERSION, profile = %profile, root = %ctx.root_dir().display(), "Starting launch");
    let mut stages = new_stages();

    let result = run_stages(ctx, profile, &mut stages).await;

    if let Err(e) = &result {
        for stage in stages.iter_mut() {
            match stage.status {
                StageStatus::Running => stage.finish(StageStatus::Failed, Some(e.to_string())),
                StageStatus::Pending => stage.skip(None),
                _ => {}
            }
        }
        error!(error = %e, "Launch aborted");
    }

    print_stage_summary(ctx, &stages);

    let mut report = result?;
    report.stages = stages;
    print_endpoints(ctx);
    Ok(report)
}

async fn run_stages(
    ctx: &LaunchContext,
    profile: Profile,
    stages: &mut [StageRecord],
) -> LaunchResult<LaunchReport> {
    let plan = ctx.config.plan(profile);

    stages[PREREQUISITES].start();
    prereq::check(ctx).await?;
    stages[PREREQUISITES].finish(StageStatus::Success, None);

    stages[FETCH].start();
    let fetch = fetch::fetch(ctx).await?;
    match fetch {
        FetchOutcome::Degraded => stages[FETCH].finish(
            StageStatus::Degraded,
            Some("using existing checkout".to_string()),
        ),
        _ => stages[FETCH].finish(StageStatus::Success, None),
    }

    stages[PREPARE_ENV].start();
    env_prep::prepare(ctx).await?;
    stages[PREPARE_ENV].finish(StageStatus::Success, None);

    stages[RECLAIM].start();
    let reclaim = reclaim::reclaim(ctx, &plan).await;
    let message = (reclaim.warnings > 0).then(|| format!("{} warnings", reclaim.warnings));
    stages[RECLAIM].finish(StageStatus::Success, message);

    stages[LAUNCH_DEPENDENCY].start();
    let dependency_attempts = launch::launch_dependency(ctx, &plan).await?;
    stages[LAUNCH_DEPENDENCY].finish(StageStatus::Success, attempts_message(dependency_attempts));

    stages[DEPENDENCY_GATE].start();
    let gate = launch::wait_for_dependency(ctx, &plan).await;
    match gate {
        GateOutcome::ProbeTimedOut => stages[DEPENDENCY_GATE].finish(
            StageStatus::Degraded,
            Some("readiness probe timed out".to_string()),
        ),
        _ => stages[DEPENDENCY_GATE].finish(StageStatus::Success, None),
    }

    stages[LAUNCH_PRIMARY].start();
    let primary_attempts = launch::launch_primary(ctx, &plan).await?;
    stages[LAUNCH_PRIMARY].finish(StageStatus::Success, attempts_message(primary_attempts));

    Ok(LaunchReport {
        profile,
        fetch,
        reclaim,
        dependency_attempts,
        gate,
        primary_attempts,
        stages: Vec::new(),
    })
}

fn attempts_message(attempts: u32) -> Option<String> {
    (attempts > 1).then(|| format!("{} attempts", attempts))
}

fn print_stage_summary(ctx: &LaunchContext, stages: &[StageRecord]) {
    ctx.log_stdout("");
    ctx.log_stdout("=== Stage Summary ===");
    for stage in stages {
        info!(
            stage = %stage.name,
            status = ?stage.status,
            duration_ms = ?stage.duration_ms,
            "Stage finished"
        );
        ctx.log_stdout(&stage.summary_line());
    }
}

fn print_endpoints(ctx: &LaunchContext) {
    ctx.log_stdout("");
    ctx.log_stdout("All services started successfully!");
    ctx.log_stdout("You can access:");
    for (name, url) in SERVICE_ENDPOINTS {
        ctx.log_stdout(&format!("- {} at: {}", name, url));
    }
}
