//! Runs a single step: precondition, then actions in order.
use std::fmt;

use serde::Serialize;

use super::{Context, Step};
use crate::facts::FactResults;

/// Why a step failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureCause {
    /// Zero-based index of the failing action.
    pub action_index: usize,
    /// Description of the failing action.
    pub action: String,
    /// Rendered error.
    pub error: String,
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "action {} ({}) failed: {}",
            self.action_index + 1,
            self.action,
            self.error
        )
    }
}

/// Outcome of running one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// The precondition held; no action ran.
    Skipped,
    /// Every action succeeded.
    Completed,
    /// Dry run: the precondition did not hold, actions were only listed.
    DryRun,
    /// An action failed; later actions did not run.
    Failed(FailureCause),
}

impl StepOutcome {
    /// `true` for [`StepOutcome::Failed`].
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped"),
            Self::Completed => write!(f, "completed"),
            Self::DryRun => write!(f, "would run"),
            Self::Failed(cause) => write!(f, "failed: {cause}"),
        }
    }
}

/// Evaluate the step's precondition with fresh fact results.
///
/// Returns `None` for steps without one.
#[must_use]
pub fn precondition_satisfied(step: &Step, ctx: &Context) -> Option<bool> {
    let precondition = step.precondition.as_ref()?;
    let facts = FactResults::new(ctx.probe.as_ref());
    Some(precondition.is_satisfied(&facts))
}

/// Run `step`.
///
/// Facts are evaluated lazily and only for this step, so changes made by
/// earlier steps are always visible. Action errors never propagate; they
/// become [`StepOutcome::Failed`].
#[must_use]
pub fn run(step: &Step, ctx: &Context) -> StepOutcome {
    if precondition_satisfied(step, ctx) == Some(true) {
        ctx.log.debug(&format!("{}: already satisfied", step.name));
        return StepOutcome::Skipped;
    }

    if ctx.dry_run {
        for action in &step.actions {
            ctx.log.dry_run(&format!("{}: {}", step.name, action.description()));
        }
        return StepOutcome::DryRun;
    }

    for (action_index, action) in step.actions.iter().enumerate() {
        ctx.log.debug(&action.description());
        if let Err(e) = action.execute(step.requires_privilege, ctx) {
            return StepOutcome::Failed(FailureCause {
                action_index,
                action: action.description(),
                error: e.to_string(),
            });
        }
    }
    StepOutcome::Completed
}
