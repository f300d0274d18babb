use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, filter_phases, version};
use crate::cli::{FilterOpts, GlobalOpts, InstallOpts};
use crate::config::Plan;
use crate::error::ProvisionError;
use crate::logging::{Log, Logger};
use crate::orchestrator::{self, ProvisioningReport};
use crate::steps::{Context, StepOutcome};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if the plan cannot be loaded or a blocking step failed.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("provision {}", version::string()));
    if global.dry_run {
        log.dry_run("no actions will be run");
    }

    let setup = CommandSetup::init(global, log.as_ref())?;
    let shared: Arc<dyn Log> = Arc::<Logger>::clone(log);
    let ctx = setup.context(shared, global.dry_run);

    let report = provision_selected(&setup.plan, &opts.filter, &ctx);
    report.print_summary(log.as_ref(), log.log_path().map(std::path::PathBuf::as_path));
    if opts.json {
        println!("{}", report.to_json()?);
    }

    check_report(&report)?;
    Ok(())
}

/// Run the steps of `plan` selected by `filter`.
///
/// Steps filtered out are not part of the report.
#[must_use]
pub fn provision_selected(plan: &Plan, filter: &FilterOpts, ctx: &Context) -> ProvisioningReport {
    let phases = filter_phases(&plan.phases, filter);
    if phases.is_empty() {
        ctx.log.warn("no steps match --only/--skip");
    }
    orchestrator::provision(&phases, ctx)
}

/// Map a halted run to an error; non-blocking failures pass.
///
/// # Errors
///
/// Returns [`ProvisionError::BlockingStepFailed`] when a blocking step halted
/// the run.
pub fn check_report(report: &ProvisioningReport) -> Result<(), ProvisionError> {
    match report.blocking_failure() {
        Some(record) => Err(ProvisionError::BlockingStepFailed {
            step: record.step.clone(),
            cause: match &record.outcome {
                StepOutcome::Failed(cause) => cause.to_string(),
                other => other.to_string(),
            },
        }),
        None => Ok(()),
    }
}
