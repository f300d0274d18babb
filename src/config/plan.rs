//! Plan file schema and its conversion into phases of steps.
use serde::Deserialize;

use super::expand::Expander;
use crate::actions::{Action, PackageManager, ShellCommand};
use crate::error::PlanError;
use crate::facts::Fact;
use crate::steps::{Phase, Precondition, Step};

/// Root of a plan file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanFile {
    /// Run-wide settings.
    #[serde(default)]
    pub settings: SettingsFile,
    /// Ordered phases.
    #[serde(default, rename = "phase")]
    pub phases: Vec<PhaseFile>,
}

/// `[settings]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    /// `brew` (default) or `paru`.
    pub external_manager: Option<String>,
    /// Scratch directory exposed as `$PROVISION_TMP` (default `/tmp`).
    pub temp_dir: Option<String>,
}

/// `[[phase]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseFile {
    /// Display name.
    pub name: String,
    /// Ordered steps.
    #[serde(default, rename = "step")]
    pub steps: Vec<StepFile>,
}

/// `[[phase.step]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepFile {
    /// Unique step name.
    pub name: String,
    /// Condition under which the step is already done.
    pub skip_if: Option<ConditionFile>,
    /// Run shell actions elevated.
    #[serde(default)]
    pub sudo: bool,
    /// Halt the run if this step fails.
    #[serde(default)]
    pub blocking: bool,
    /// The step deliberately has no condition.
    #[serde(default)]
    pub always_run: bool,
    /// Ordered actions.
    #[serde(default, rename = "action")]
    pub actions: Vec<ActionFile>,
}

/// `[[phase.step.action]]` entry, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionFile {
    /// `sh -c` command.
    Shell {
        /// Command text.
        command: String,
        /// Working directory.
        workdir: Option<String>,
        /// Privilege override.
        sudo: Option<bool>,
        /// Tolerate a non-zero exit.
        #[serde(default)]
        allow_failure: bool,
    },
    /// HTTP download.
    Download {
        /// Source URL.
        url: String,
        /// Destination file.
        dest: String,
        /// Pinned SHA-256 digest.
        sha256: Option<String>,
    },
    /// Directory creation.
    Directory {
        /// Directory path.
        path: String,
    },
    /// Symlink creation.
    Symlink {
        /// What the link points at.
        target: String,
        /// Where the link lives.
        link: String,
    },
    /// System package installation.
    OsPackages {
        /// Package names.
        names: Vec<String>,
    },
    /// External package installation.
    ExternalPackages {
        /// Package names.
        names: Vec<String>,
    },
    /// Git clone.
    Clone {
        /// Repository URL.
        url: String,
        /// Checkout directory.
        dest: String,
    },
    /// Path removal.
    Remove {
        /// Path to delete.
        path: String,
    },
}

/// Declarative skip condition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum ConditionFile {
    /// File or symlink exists.
    File(String),
    /// Directory exists.
    Directory(String),
    /// Binary on `PATH`.
    Binary(String),
    /// Command succeeds with non-empty output.
    Output(String),
    /// Command output equals `expected`.
    OutputEquals {
        /// Shell command.
        command: String,
        /// Expected trimmed output.
        expected: String,
    },
    /// Command output contains `needle`.
    OutputContains {
        /// Shell command.
        command: String,
        /// Substring.
        needle: String,
    },
    /// `version` listed by `command`.
    VersionInstalled {
        /// Version-listing command.
        command: String,
        /// Version to find.
        version: String,
    },
    /// All conditions hold.
    All(Vec<ConditionFile>),
    /// Any condition holds.
    Any(Vec<ConditionFile>),
    /// Condition does not hold.
    Not(Box<ConditionFile>),
}

/// Resolved run-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Manager for `external_packages` actions.
    pub external_manager: PackageManager,
    /// Value of `$PROVISION_TMP`.
    pub temp_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            external_manager: PackageManager::Brew,
            temp_dir: "/tmp".to_string(),
        }
    }
}

/// A loaded, expanded plan.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Run-wide settings.
    pub settings: Settings,
    /// Ordered phases.
    pub phases: Vec<Phase>,
}

impl Plan {
    /// Every step with its phase name, in execution order.
    pub fn steps(&self) -> impl Iterator<Item = (&str, &Step)> {
        self.phases
            .iter()
            .flat_map(|p| p.steps.iter().map(move |s| (p.name.as_str(), s)))
    }

    /// Total number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.phases.iter().map(|p| p.steps.len()).sum()
    }
}

impl SettingsFile {
    /// Resolve defaults and parse the manager name.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown or system-only manager, or if the
    /// temp directory cannot be expanded.
    pub fn resolve(&self, home: Option<&str>) -> Result<Settings, PlanError> {
        let mut settings = Settings::default();
        if let Some(name) = &self.external_manager {
            settings.external_manager = match name.parse::<PackageManager>() {
                Ok(m @ (PackageManager::Brew | PackageManager::Paru)) => m,
                _ => return Err(PlanError::UnknownManager(name.clone())),
            };
        }
        if let Some(dir) = &self.temp_dir {
            let expander = home.map_or_else(
                || Expander::new(settings.temp_dir.clone()),
                |h| Expander::with_home(h, settings.temp_dir.clone()),
            );
            settings.temp_dir = expander.path(dir)?.display().to_string();
        }
        Ok(settings)
    }
}

impl ConditionFile {
    fn into_precondition(self, ex: &Expander) -> Result<Precondition, PlanError> {
        Ok(match self {
            Self::File(p) => Precondition::Holds(Fact::FileExists(ex.path(&p)?)),
            Self::Directory(p) => Precondition::Holds(Fact::DirectoryExists(ex.path(&p)?)),
            Self::Binary(name) => Precondition::binary(name),
            Self::Output(cmd) => Precondition::OutputNonEmpty(ex.command(&cmd)),
            Self::OutputEquals { command, expected } => Precondition::OutputEquals {
                command: ex.command(&command),
                expected,
            },
            Self::OutputContains { command, needle } => Precondition::OutputContains {
                command: ex.command(&command),
                needle,
            },
            Self::VersionInstalled { command, version } => Precondition::VersionInstalled {
                command: ex.command(&command),
                version,
            },
            Self::All(inner) => Precondition::All(convert_all(inner, ex)?),
            Self::Any(inner) => Precondition::Any(convert_all(inner, ex)?),
            Self::Not(inner) => Precondition::Not(Box::new(inner.into_precondition(ex)?)),
        })
    }
}

fn convert_all(inner: Vec<ConditionFile>, ex: &Expander) -> Result<Vec<Precondition>, PlanError> {
    inner.into_iter().map(|c| c.into_precondition(ex)).collect()
}

impl ActionFile {
    fn into_action(self, ex: &Expander) -> Result<Action, PlanError> {
        Ok(match self {
            Self::Shell {
                command,
                workdir,
                sudo,
                allow_failure,
            } => Action::RunShell(ShellCommand {
                command: ex.command(&command),
                workdir: workdir.map(|w| ex.path(&w)).transpose()?,
                elevated: sudo,
                allow_failure,
            }),
            Self::Download { url, dest, sha256 } => Action::DownloadFile {
                url,
                destination: ex.path(&dest)?,
                sha256,
            },
            Self::Directory { path } => Action::EnsureDirectory(ex.path(&path)?),
            Self::Symlink { target, link } => Action::CreateSymlink {
                target: ex.path(&target)?,
                link: ex.path(&link)?,
            },
            Self::OsPackages { names } => Action::InstallOsPackages(names),
            Self::ExternalPackages { names } => Action::InstallExternalPackages(names),
            Self::Clone { url, dest } => Action::CloneRepository {
                url,
                destination: ex.path(&dest)?,
            },
            Self::Remove { path } => Action::RemovePath(ex.path(&path)?),
        })
    }
}

impl StepFile {
    fn into_step(self, ex: &Expander) -> Result<Step, PlanError> {
        Ok(Step {
            precondition: self.skip_if.map(|c| c.into_precondition(ex)).transpose()?,
            actions: self
                .actions
                .into_iter()
                .map(|a| a.into_action(ex))
                .collect::<Result<_, _>>()?,
            requires_privilege: self.sudo,
            blocking: self.blocking,
            name: self.name,
        })
    }
}

impl PlanFile {
    /// Expand paths and build the runnable plan.
    ///
    /// Structural checks are the caller's job (see
    /// [`check_structure`](super::validation::check_structure)).
    ///
    /// # Errors
    ///
    /// Returns an error if settings are invalid or a path cannot be expanded.
    pub fn into_plan(self, home: Option<&str>) -> Result<Plan, PlanError> {
        let settings = self.settings.resolve(home)?;
        let ex = home.map_or_else(
            || Expander::new(settings.temp_dir.clone()),
            |h| Expander::with_home(h, settings.temp_dir.clone()),
        );
        let phases = self
            .phases
            .into_iter()
            .map(|phase| {
                let steps = phase
                    .steps
                    .into_iter()
                    .map(|s| s.into_step(&ex))
                    .collect::<Result<_, _>>()?;
                Ok(Phase::new(phase.name, steps))
            })
            .collect::<Result<_, PlanError>>()?;
        Ok(Plan { settings, phases })
    }
}
