//! Plan loading: parsing, expansion and validation.
pub mod expand;
pub mod plan;
pub mod toml_loader;
pub mod validation;

use std::path::Path;

pub use plan::{Plan, PlanFile, Settings};
pub use validation::ValidationWarning;

use crate::error::PlanError;
use crate::exec::Executor;
use crate::platform::Platform;

/// The plan shipped with the binary.
pub const DEFAULT_PLAN: &str = include_str!("../../conf/plan.toml");

/// Name used for the embedded plan in error messages.
pub const DEFAULT_ORIGIN: &str = "built-in plan";

/// A validated plan and the warnings raised while loading it.
#[derive(Debug)]
pub struct LoadedPlan {
    /// The runnable plan.
    pub plan: Plan,
    /// Non-fatal findings, in validator order.
    pub warnings: Vec<ValidationWarning>,
}

/// Parse the plan at `path`, or the embedded default plan.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_plan(path: Option<&Path>) -> Result<PlanFile, PlanError> {
    match path {
        Some(path) => toml_loader::load_config(path),
        None => toml_loader::parse_config(DEFAULT_PLAN, DEFAULT_ORIGIN),
    }
}

/// Check, validate and convert a parsed plan.
///
/// `home` overrides `$HOME` for path expansion.
///
/// # Errors
///
/// Returns an error for structural problems or bad settings; warnings are
/// returned alongside the plan.
pub fn prepare(
    file: PlanFile,
    home: Option<&str>,
    platform: &Platform,
    executor: &dyn Executor,
) -> Result<LoadedPlan, PlanError> {
    validation::check_structure(&file)?;
    let settings = file.settings.resolve(home)?;
    let host = validation::HostView {
        platform,
        executor,
        settings: &settings,
    };
    let warnings = validation::validate_all(&file, &host);
    let plan = file.into_plan(home)?;
    Ok(LoadedPlan { plan, warnings })
}

/// Load the plan at `path` (or the default plan) for this host.
///
/// # Errors
///
/// Returns an error if the plan cannot be read, parsed or validated.
pub fn load(
    path: Option<&Path>,
    platform: &Platform,
    executor: &dyn Executor,
) -> Result<LoadedPlan, PlanError> {
    prepare(read_plan(path)?, None, platform, executor)
}
