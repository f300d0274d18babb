//! Command: report which steps would run.
use anyhow::Result;
use std::sync::Arc;

use super::{CommandSetup, filter_phases};
use crate::cli::{FilterOpts, GlobalOpts};
use crate::config::Plan;
use crate::logging::{Log, Logger};
use crate::steps::{Context, runner};

/// Whether a step still has work to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    /// The skip condition holds.
    Satisfied,
    /// The skip condition does not hold.
    WouldRun,
    /// The step has no skip condition.
    AlwaysRuns,
}

/// Evaluate every selected precondition without running any action.
#[must_use]
pub fn evaluate(plan: &Plan, filter: &FilterOpts, ctx: &Context) -> Vec<(String, Pending)> {
    let mut results = Vec::new();
    for phase in filter_phases(&plan.phases, filter) {
        ctx.log.stage(&phase.name);
        for step in &phase.steps {
            let pending = match runner::precondition_satisfied(step, ctx) {
                Some(true) => Pending::Satisfied,
                Some(false) => Pending::WouldRun,
                None => Pending::AlwaysRuns,
            };
            let label = match pending {
                Pending::Satisfied => "satisfied",
                Pending::WouldRun => "would run",
                Pending::AlwaysRuns => "always runs",
            };
            ctx.log.info(&format!("{}: {label}", step.name));
            results.push((step.name.clone(), pending));
        }
    }
    results
}

/// Run the check command.
///
/// # Errors
///
/// Returns an error if the plan cannot be loaded.
pub fn run(global: &GlobalOpts, opts: &FilterOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log.as_ref())?;
    let shared: Arc<dyn Log> = Arc::<Logger>::clone(log);
    let ctx = setup.context(shared, true);
    let results = evaluate(&setup.plan, opts, &ctx);
    let pending = results
        .iter()
        .filter(|(_, p)| *p != Pending::Satisfied)
        .count();
    log.info(&format!("{pending} of {} steps would run", results.len()));
    Ok(())
}
