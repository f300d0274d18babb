//! Shell command action.
use std::path::PathBuf;

use super::error::{ActionError, describe_status};
use crate::steps::Context;

/// A command line handed to `sh -c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    /// Command text, interpreted by `sh`.
    pub command: String,
    /// Working directory, or the current directory when unset.
    pub workdir: Option<PathBuf>,
    /// Per-command privilege override; `None` inherits the step's setting.
    pub elevated: Option<bool>,
    /// Treat a non-zero exit as success.
    pub allow_failure: bool,
}

impl ShellCommand {
    /// A command run in the current directory with inherited privilege.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            workdir: None,
            elevated: None,
            allow_failure: false,
        }
    }

    /// Run from `dir`.
    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Override the step's privilege setting for this command only.
    #[must_use]
    pub const fn elevated(mut self, elevated: bool) -> Self {
        self.elevated = Some(elevated);
        self
    }

    /// Do not fail the step when the command exits non-zero.
    #[must_use]
    pub const fn allow_failure(mut self) -> Self {
        self.allow_failure = true;
        self
    }

    /// Run the command.
    ///
    /// Elevated commands are prefixed with `sudo` unless the process already
    /// runs as root.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Spawn`] if `sh` cannot be started and
    /// [`ActionError::CommandFailed`] on a non-zero exit (unless tolerated).
    pub fn run(&self, step_privileged: bool, ctx: &Context) -> Result<(), ActionError> {
        let elevated = self.elevated.unwrap_or(step_privileged) && ctx.elevate;
        let (program, args): (&str, Vec<&str>) = if elevated {
            ("sudo", vec!["sh", "-c", &self.command])
        } else {
            ("sh", vec!["-c", &self.command])
        };

        let result = ctx
            .executor
            .run_unchecked_in(self.workdir.as_deref(), program, &args)
            .map_err(|e| ActionError::Spawn {
                command: self.command.clone(),
                reason: format!("{e:#}"),
            })?;

        let output = result.combined_output();
        if !output.is_empty() {
            ctx.log.debug(&output);
        }

        if result.success {
            return Ok(());
        }
        let status = describe_status(result.code);
        if self.allow_failure {
            ctx.log
                .debug(&format!("tolerated failure ({status}): {}", self.command));
            return Ok(());
        }
        Err(ActionError::CommandFailed {
            command: self.command.clone(),
            status,
            output,
        })
    }
}
