//! Steps: named units of work guarded by an optional precondition.
mod context;
pub mod precondition;
pub mod runner;

pub use context::Context;
pub use precondition::Precondition;
pub use runner::{FailureCause, StepOutcome};

use crate::actions::Action;

/// A named unit of work.
///
/// When the precondition is satisfied the step's work is considered done
/// and its actions are skipped. A step without a precondition always runs.
#[derive(Debug, Clone)]
pub struct Step {
    /// Unique name within a plan.
    pub name: String,
    /// Skip condition.
    pub precondition: Option<Precondition>,
    /// Actions run in order; the first failure aborts the rest.
    pub actions: Vec<Action>,
    /// Shell actions run elevated unless they override it.
    pub requires_privilege: bool,
    /// A failure halts the whole run.
    pub blocking: bool,
}

impl Step {
    /// An empty, unprivileged, non-blocking step.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            precondition: None,
            actions: Vec::new(),
            requires_privilege: false,
            blocking: false,
        }
    }

    /// Skip the step when `precondition` holds.
    #[must_use]
    pub fn skip_if(mut self, precondition: Precondition) -> Self {
        self.precondition = Some(precondition);
        self
    }

    /// Append an action.
    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Run shell actions elevated.
    #[must_use]
    pub const fn privileged(mut self) -> Self {
        self.requires_privilege = true;
        self
    }

    /// Halt the run if this step fails.
    #[must_use]
    pub const fn blocking(mut self) -> Self {
        self.blocking = true;
        self
    }
}

/// An ordered group of steps.
#[derive(Debug, Clone)]
pub struct Phase {
    /// Display name.
    pub name: String,
    /// Steps in execution order.
    pub steps: Vec<Step>,
}

impl Phase {
    /// Create a phase.
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
        }
    }
}
