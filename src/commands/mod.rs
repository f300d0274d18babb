//! Subcommand handlers and their shared setup.
pub mod check;
pub mod completions;
pub mod install;
pub mod list;
pub mod version;

use std::sync::Arc;

use crate::cli::{FilterOpts, GlobalOpts};
use crate::config::{self, Plan};
use crate::error::ProvisionError;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Log;
use crate::platform::Platform;
use crate::steps::{Context, Phase};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates platform detection and plan loading so that each command
/// does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected platform.
    pub platform: Arc<Platform>,
    /// Process spawner shared by probes and actions.
    pub executor: Arc<dyn Executor>,
    /// The loaded plan.
    pub plan: Plan,
}

impl CommandSetup {
    /// Detect the platform and load the plan (the built-in one unless
    /// `--plan` is given).
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Plan`] if the plan cannot be read, parsed or
    /// validated.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self, ProvisionError> {
        Self::init_with(global, log, Platform::detect(), Arc::new(SystemExecutor))
    }

    /// Like [`init`](Self::init) with an explicit platform and executor.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Plan`] if the plan cannot be read, parsed or
    /// validated.
    pub fn init_with(
        global: &GlobalOpts,
        log: &dyn Log,
        platform: Platform,
        executor: Arc<dyn Executor>,
    ) -> Result<Self, ProvisionError> {
        log.debug(&format!("platform: {} ({})", platform.os, platform.distro));

        let origin = global
            .plan
            .as_ref()
            .map_or_else(|| config::DEFAULT_ORIGIN.to_string(), |p| p.display().to_string());
        log.stage("Loading plan");
        let loaded = config::load(global.plan.as_deref(), &platform, executor.as_ref())
            .map_err(|source| ProvisionError::Plan {
                origin: origin.clone(),
                source,
            })?;
        log.info(&format!(
            "{origin}: {} phases, {} steps",
            loaded.plan.phases.len(),
            loaded.plan.step_count()
        ));

        if !loaded.warnings.is_empty() {
            log.warn(&format!(
                "found {} plan warning(s):",
                loaded.warnings.len()
            ));
            for warning in &loaded.warnings {
                log.warn(&format!(
                    "  {} [{}]: {}",
                    warning.source, warning.item, warning.message
                ));
            }
        }

        Ok(Self {
            platform: Arc::new(platform),
            executor,
            plan: loaded.plan,
        })
    }

    /// Build the step execution context.
    #[must_use]
    pub fn context(&self, log: Arc<dyn Log>, dry_run: bool) -> Context {
        Context::new(
            Arc::clone(&self.platform),
            log,
            Arc::clone(&self.executor),
            dry_run,
        )
        .with_external_manager(self.plan.settings.external_manager)
    }
}

/// `true` if `name` passes `--only`/`--skip` (case-insensitive substring).
///
/// `--only` wins when both are given.
#[must_use]
pub fn step_selected(name: &str, filter: &FilterOpts) -> bool {
    let name = name.to_lowercase();
    if !filter.only.is_empty() {
        return filter.only.iter().any(|o| name.contains(&o.to_lowercase()));
    }
    if !filter.skip.is_empty() {
        return !filter.skip.iter().any(|s| name.contains(&s.to_lowercase()));
    }
    true
}

/// Phases restricted to the selected steps; phases left empty are dropped.
#[must_use]
pub fn filter_phases(phases: &[Phase], filter: &FilterOpts) -> Vec<Phase> {
    phases
        .iter()
        .filter_map(|phase| {
            let steps: Vec<_> = phase
                .steps
                .iter()
                .filter(|s| step_selected(&s.name, filter))
                .cloned()
                .collect();
            (!steps.is_empty()).then(|| Phase::new(phase.name.clone(), steps))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::PlanError;
    use crate::logging::RecordingLog;
    use crate::platform::{Distro, Os};
    use crate::steps::Step;
    use crate::steps::test_helpers::MockExecutor;
    use std::path::PathBuf;

    fn setup_from(plan: Option<PathBuf>) -> (Result<CommandSetup, ProvisionError>, RecordingLog) {
        let log = RecordingLog::default();
        let global = GlobalOpts {
            plan,
            dry_run: false,
        };
        let executor = Arc::new(MockExecutor::with_responses(vec![]).with_which(true));
        let result = CommandSetup::init_with(
            &global,
            &log,
            Platform::new(Os::Linux, Distro::Debian),
            executor,
        );
        (result, log)
    }

    #[test]
    fn missing_plan_file_is_a_plan_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let (result, _log) = setup_from(Some(path.clone()));
        let err = result.unwrap_err();
        assert!(
            matches!(&err, ProvisionError::Plan { origin, source: PlanError::Read { .. } } if *origin == path.display().to_string()),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn invalid_plan_file_is_a_plan_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        std::fs::write(&path, "[[phase]]\nname = \"empty\"\nstep = []\n").unwrap();
        let (result, _log) = setup_from(Some(path));
        assert!(matches!(
            result,
            Err(ProvisionError::Plan {
                source: PlanError::EmptyPhase(_),
                ..
            })
        ));
    }

    #[test]
    fn built_in_plan_loads() {
        let (result, log) = setup_from(None);
        let setup = result.unwrap();
        assert_eq!(setup.plan.step_count(), 31);
        assert!(log.contains("info", "built-in plan: 4 phases, 31 steps"));
    }

    fn filter(only: &[&str], skip: &[&str]) -> FilterOpts {
        FilterOpts {
            only: only.iter().map(ToString::to_string).collect(),
            skip: skip.iter().map(ToString::to_string).collect(),
        }
    }

    fn phases() -> Vec<Phase> {
        vec![
            Phase::new(
                "packages",
                vec![Step::new("Install fzf"), Step::new("Install lazygit")],
            ),
            Phase::new(
                "scripts",
                vec![
                    Step::new("Install python 3.9.9"),
                    Step::new("Install python 3.10.0"),
                ],
            ),
        ]
    }

    #[test]
    fn no_filter_selects_everything() {
        assert!(step_selected("anything", &FilterOpts::default()));
    }

    #[test]
    fn only_is_case_insensitive_substring() {
        let f = filter(&["PYTHON"], &[]);
        assert!(step_selected("Install python 3.9.9", &f));
        assert!(!step_selected("Install fzf", &f));
    }

    #[test]
    fn only_takes_precedence_over_skip() {
        let f = filter(&["fzf"], &["fzf"]);
        assert!(step_selected("Install fzf", &f));
    }

    #[test]
    fn skip_drops_emptied_phases() {
        let kept = filter_phases(&phases(), &filter(&[], &["python"]));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "packages");
        assert_eq!(kept[0].steps.len(), 2);
    }

    #[test]
    fn only_keeps_phase_order() {
        let kept = filter_phases(&phases(), &filter(&["3.10", "lazygit"], &[]));
        let names: Vec<_> = kept
            .iter()
            .flat_map(|p| p.steps.iter().map(|s| s.name.as_str()))
            .collect();
        assert_eq!(names, vec!["Install lazygit", "Install python 3.10.0"]);
    }
}
