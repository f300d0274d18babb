//! Structural checks and host-aware warnings for plans.
use std::collections::HashSet;

use super::plan::{ActionFile, PlanFile, Settings, StepFile};
use crate::error::PlanError;
use crate::exec::{self, Executor};
use crate::platform::Platform;

/// Check the plan for mistakes that make it unrunnable.
///
/// # Errors
///
/// Returns the first structural problem found: no phases, an empty phase, a
/// step without actions, a duplicate step name, or a blank command or
/// package name.
pub fn check_structure(plan: &PlanFile) -> Result<(), PlanError> {
    if plan.phases.is_empty() {
        return Err(PlanError::EmptyPlan);
    }
    let mut seen = HashSet::new();
    for phase in &plan.phases {
        if phase.steps.is_empty() {
            return Err(PlanError::EmptyPhase(phase.name.clone()));
        }
        for step in &phase.steps {
            if step.name.trim().is_empty() {
                return Err(PlanError::BlankField {
                    step: format!("in phase '{}'", phase.name),
                    field: "name".to_string(),
                });
            }
            if !seen.insert(step.name.as_str()) {
                return Err(PlanError::DuplicateStep(step.name.clone()));
            }
            if step.actions.is_empty() {
                return Err(PlanError::EmptyStep(step.name.clone()));
            }
            check_actions(step)?;
        }
    }
    Ok(())
}

fn check_actions(step: &StepFile) -> Result<(), PlanError> {
    let blank = |field: &str| PlanError::BlankField {
        step: step.name.clone(),
        field: field.to_string(),
    };
    for action in &step.actions {
        match action {
            ActionFile::Shell { command, .. } if command.trim().is_empty() => {
                return Err(blank("command"));
            }
            ActionFile::OsPackages { names } | ActionFile::ExternalPackages { names } => {
                if names.is_empty() || names.iter().any(|n| n.trim().is_empty()) {
                    return Err(blank("package name"));
                }
            }
            ActionFile::Download { url, .. } | ActionFile::Clone { url, .. }
                if url.trim().is_empty() =>
            {
                return Err(blank("url"));
            }
            _ => {}
        }
    }
    Ok(())
}

/// A validation warning detected during plan loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The validator that raised it (e.g., "preconditions", "packages").
    pub source: String,
    /// The step that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Host facts the validators consult.
#[derive(Debug, Clone, Copy)]
pub struct HostView<'a> {
    /// Detected platform.
    pub platform: &'a Platform,
    /// Used for `which` and root checks only.
    pub executor: &'a dyn Executor,
    /// Resolved plan settings.
    pub settings: &'a Settings,
}

/// Trait for plan validators.
///
/// Validators never fail the load; they flag steps that will probably not
/// behave as intended on this host.
pub trait PlanValidator {
    /// Validate the plan and return any warnings found.
    fn validate(&self, plan: &PlanFile, host: &HostView<'_>) -> Vec<ValidationWarning>;

    /// Return a human-readable name for this validator.
    fn name(&self) -> &'static str;
}

fn steps(plan: &PlanFile) -> impl Iterator<Item = &StepFile> {
    plan.phases.iter().flat_map(|p| p.steps.iter())
}

/// Flags steps that have no skip condition and are not marked `always_run`.
#[derive(Debug, Default)]
pub struct PreconditionValidator;

impl PlanValidator for PreconditionValidator {
    fn validate(&self, plan: &PlanFile, _host: &HostView<'_>) -> Vec<ValidationWarning> {
        steps(plan)
            .filter(|s| s.skip_if.is_none() && !s.always_run)
            .map(|s| {
                ValidationWarning::new(
                    self.name(),
                    &s.name,
                    "no skip_if condition: the step runs on every invocation",
                )
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "preconditions"
    }
}

/// Flags privileged work when `sudo` is unavailable and we are not root.
#[derive(Debug, Default)]
pub struct PrivilegeValidator;

fn needs_privilege(step: &StepFile) -> bool {
    step.actions.iter().any(|a| match a {
        ActionFile::Shell { sudo, .. } => sudo.unwrap_or(step.sudo),
        ActionFile::OsPackages { .. } => true,
        _ => false,
    })
}

impl PlanValidator for PrivilegeValidator {
    fn validate(&self, plan: &PlanFile, host: &HostView<'_>) -> Vec<ValidationWarning> {
        if exec::is_root(host.executor) || host.executor.which("sudo") {
            return Vec::new();
        }
        steps(plan)
            .filter(|s| needs_privilege(s))
            .map(|s| {
                ValidationWarning::new(
                    self.name(),
                    &s.name,
                    "needs root but sudo is not on PATH",
                )
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "privilege"
    }
}

/// Flags package actions whose manager cannot be found on this host.
#[derive(Debug, Default)]
pub struct PackageValidator;

impl PlanValidator for PackageValidator {
    fn validate(&self, plan: &PlanFile, host: &HostView<'_>) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let external = host.settings.external_manager;
        let external_missing = !host.executor.which(external.binary());

        for step in steps(plan) {
            for action in &step.actions {
                match action {
                    ActionFile::OsPackages { .. } if host.platform.os_package_manager().is_none() => {
                        warnings.push(ValidationWarning::new(
                            self.name(),
                            &step.name,
                            format!(
                                "no system package manager detected for {} ({})",
                                host.platform.os, host.platform.distro
                            ),
                        ));
                    }
                    ActionFile::ExternalPackages { .. } if external_missing => {
                        warnings.push(ValidationWarning::new(
                            self.name(),
                            &step.name,
                            format!("{external} is not on PATH"),
                        ));
                    }
                    _ => {}
                }
            }
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "packages"
    }
}

/// Run every validator and collect the warnings.
#[must_use]
pub fn validate_all(plan: &PlanFile, host: &HostView<'_>) -> Vec<ValidationWarning> {
    let validators: Vec<Box<dyn PlanValidator>> = vec![
        Box::new(PreconditionValidator),
        Box::new(PrivilegeValidator),
        Box::new(PackageValidator),
    ];

    let mut all_warnings = Vec::new();
    for validator in validators {
        all_warnings.extend(validator.validate(plan, host));
    }
    all_warnings
}
