//! Per-run record of step outcomes.
use std::path::Path;

use serde::Serialize;

use crate::logging::Log;
use crate::steps::StepOutcome;

/// Outcome of one step, with where it sat in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Owning phase.
    pub phase: String,
    /// Step name.
    pub step: String,
    /// Whether the step was blocking.
    pub blocking: bool,
    /// What happened.
    pub outcome: StepOutcome,
}

/// Ordered outcomes of every step that ran, plus why the run stopped early.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProvisioningReport {
    /// One record per attempted step, in execution order.
    pub steps: Vec<StepRecord>,
    /// Name of the blocking step that halted the run, if any.
    pub halted_by: Option<String>,
}

/// Tally of outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    /// Steps whose actions all ran.
    pub completed: usize,
    /// Steps whose precondition held.
    pub skipped: usize,
    /// Steps listed but not run (dry run).
    pub dry_run: usize,
    /// Steps with a failing action.
    pub failed: usize,
}

impl ProvisioningReport {
    /// Outcome recorded for `step`, if it ran.
    #[must_use]
    pub fn outcome_of(&self, step: &str) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|r| r.step == step)
            .map(|r| &r.outcome)
    }

    /// Records of failed steps.
    pub fn failures(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|r| r.outcome.is_failure())
    }

    /// The failed blocking step that halted the run.
    #[must_use]
    pub fn blocking_failure(&self) -> Option<&StepRecord> {
        let name = self.halted_by.as_deref()?;
        self.steps.iter().find(|r| r.step == name)
    }

    /// Tally outcomes.
    #[must_use]
    pub fn counts(&self) -> Counts {
        let mut counts = Counts::default();
        for record in &self.steps {
            match record.outcome {
                StepOutcome::Completed => counts.completed += 1,
                StepOutcome::Skipped => counts.skipped += 1,
                StepOutcome::DryRun => counts.dry_run += 1,
                StepOutcome::Failed(_) => counts.failed += 1,
            }
        }
        counts
    }

    /// Render the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Log a per-step summary followed by totals.
    pub fn print_summary(&self, log: &dyn Log, log_path: Option<&Path>) {
        if self.steps.is_empty() {
            return;
        }
        log.stage("Summary");
        for record in &self.steps {
            let icon = match record.outcome {
                StepOutcome::Completed => "✓",
                StepOutcome::Skipped => "○",
                StepOutcome::DryRun => "~",
                StepOutcome::Failed(_) => "✗",
            };
            let suffix = match &record.outcome {
                StepOutcome::Failed(cause) => format!(" ({cause})"),
                _ => String::new(),
            };
            log.info(&format!("{icon} {}{suffix}", record.step));
        }

        let c = self.counts();
        let total = self.steps.len();
        log.info(&format!(
            "{total} steps: {} completed, {} skipped, {} dry-run, {} failed",
            c.completed, c.skipped, c.dry_run, c.failed
        ));
        if let Some(step) = &self.halted_by {
            log.error(&format!("run halted by blocking step '{step}'"));
        }
        if let Some(path) = log_path {
            log.info(&format!("log: {}", path.display()));
        }
    }
}
