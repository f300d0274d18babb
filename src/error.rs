//! Domain-specific error types for the provisioning engine.
//!
//! Library code returns these typed errors; the command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ProvisionError
//! ├── Plan { PlanError }    : reading, parsing, expanding, validating the plan
//! └── BlockingStepFailed    : a blocking step failed and halted the run
//! ```
//!
//! Action failures are [`ActionError`](crate::actions::ActionError)s; they
//! never escape the step runner as errors but become a failed step outcome.

use thiserror::Error;

/// Top-level error type for a provisioning run.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The plan could not be loaded.
    #[error("failed to load {origin}: {source}")]
    Plan {
        /// Plan path, or `built-in plan`.
        origin: String,
        /// What went wrong.
        source: PlanError,
    },

    /// A step marked `blocking` failed, so the run stopped.
    #[error("blocking step '{step}' failed: {cause}")]
    BlockingStepFailed {
        /// Name of the step that halted the run.
        step: String,
        /// Rendered failure cause.
        cause: String,
    },
}

/// Errors that arise while loading a plan.
#[derive(Error, Debug)]
pub enum PlanError {
    /// The plan file could not be read.
    #[error("IO error reading plan file {path}: {source}")]
    Read {
        /// Path of the plan file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The plan is not valid TOML or does not match the plan schema.
    #[error("invalid plan {origin}: {message}")]
    Parse {
        /// Where the plan came from (a path or `built-in plan`).
        origin: String,
        /// Parser message.
        message: String,
    },

    /// Two steps share a name.
    #[error("duplicate step name '{0}'")]
    DuplicateStep(String),

    /// The plan has no phases.
    #[error("plan contains no phases")]
    EmptyPlan,

    /// A phase has no steps.
    #[error("phase '{0}' contains no steps")]
    EmptyPhase(String),

    /// A step has no actions.
    #[error("step '{0}' has no actions")]
    EmptyStep(String),

    /// A required string field is blank.
    #[error("step '{step}': {field} must not be empty")]
    BlankField {
        /// Step containing the blank field.
        step: String,
        /// Name of the field.
        field: String,
    },

    /// A path could not be expanded (`~`, `$VAR`).
    #[error("cannot expand '{input}': {reason}")]
    Expand {
        /// The unexpanded input.
        input: String,
        /// Why expansion failed.
        reason: String,
    },

    /// The configured external package manager is not supported.
    #[error("unknown external package manager '{0}': must be one of brew, paru")]
    UnknownManager(String),
}
