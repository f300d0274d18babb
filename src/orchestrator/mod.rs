//! Runs phases of steps in order and collects their outcomes.
mod report;

pub use report::{Counts, ProvisioningReport, StepRecord};

use crate::steps::{Context, Phase, StepOutcome, runner};

/// Run every step of every phase, in order.
///
/// A failed step is logged and recorded, then the run moves on, unless the
/// step is blocking, in which case nothing after it runs.
#[must_use]
pub fn provision(phases: &[Phase], ctx: &Context) -> ProvisioningReport {
    let mut report = ProvisioningReport::default();
    for phase in phases {
        ctx.log.stage(&phase.name);
        for step in &phase.steps {
            ctx.log.info(&step.name);
            let outcome = runner::run(step, ctx);
            match &outcome {
                StepOutcome::Skipped => ctx.log.info("  already satisfied"),
                StepOutcome::Failed(cause) => {
                    ctx.log.error(&format!("{}: {cause}", step.name));
                }
                StepOutcome::Completed | StepOutcome::DryRun => {}
            }
            let halt = step.blocking && outcome.is_failure();
            report.steps.push(StepRecord {
                phase: phase.name.clone(),
                step: step.name.clone(),
                blocking: step.blocking,
                outcome,
            });
            if halt {
                report.halted_by = Some(step.name.clone());
                return report;
            }
        }
    }
    report
}
