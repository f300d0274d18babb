//! Skip conditions evaluated against [`FactResults`].
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::facts::{Fact, FactResults};

/// Boxed predicate for conditions that cannot be expressed declaratively.
pub type PredicateFn = Arc<dyn Fn(&FactResults<'_>) -> bool + Send + Sync>;

/// A condition that, when satisfied, means a step's work is already done.
#[derive(Clone)]
pub enum Precondition {
    /// The fact is present (a value, even empty, counts).
    Holds(Fact),
    /// The command succeeds with non-empty output.
    OutputNonEmpty(String),
    /// The command's trimmed output equals `expected`.
    OutputEquals {
        /// Shell command.
        command: String,
        /// Expected trimmed output.
        expected: String,
    },
    /// The command's output contains `needle`.
    OutputContains {
        /// Shell command.
        command: String,
        /// Substring to look for.
        needle: String,
    },
    /// `version` is among the lines printed by `command`.
    VersionInstalled {
        /// Shell command listing versions.
        command: String,
        /// Version to look for.
        version: String,
    },
    /// Every inner condition holds (vacuously true when empty).
    All(Vec<Self>),
    /// At least one inner condition holds.
    Any(Vec<Self>),
    /// The inner condition does not hold.
    Not(Box<Self>),
    /// A labelled predicate over the fact results.
    Check {
        /// Shown in listings in place of the closure.
        label: String,
        /// The predicate itself.
        predicate: PredicateFn,
    },
}

impl fmt::Debug for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl Precondition {
    /// A regular file (or symlink) exists at `path`.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::Holds(Fact::FileExists(path.into()))
    }

    /// A directory exists at `path`.
    #[must_use]
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::Holds(Fact::DirectoryExists(path.into()))
    }

    /// `name` resolves on the search path.
    #[must_use]
    pub fn binary(name: impl Into<String>) -> Self {
        Self::Holds(Fact::BinaryOnPath(name.into()))
    }

    /// A custom predicate.
    #[must_use]
    pub fn check(
        label: impl Into<String>,
        predicate: impl Fn(&FactResults<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::Check {
            label: label.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Evaluate against `facts`.
    #[must_use]
    pub fn is_satisfied(&self, facts: &FactResults<'_>) -> bool {
        match self {
            Self::Holds(fact) => facts.get(fact).is_present(),
            Self::OutputNonEmpty(cmd) => facts.command_output(cmd).is_some_and(|o| !o.is_empty()),
            Self::OutputEquals { command, expected } => facts
                .command_output(command)
                .is_some_and(|o| o == expected.trim()),
            Self::OutputContains { command, needle } => facts
                .command_output(command)
                .is_some_and(|o| o.contains(needle.as_str())),
            Self::VersionInstalled { command, version } => facts
                .installed_versions(command)
                .iter()
                .any(|v| v == version),
            Self::All(inner) => inner.iter().all(|p| p.is_satisfied(facts)),
            Self::Any(inner) => inner.iter().any(|p| p.is_satisfied(facts)),
            Self::Not(inner) => !inner.is_satisfied(facts),
            Self::Check { predicate, .. } => predicate(facts),
        }
    }

    /// One-line rendering for listings and logs.
    #[must_use]
    pub fn describe(&self) -> String {
        let join = |inner: &[Self], sep: &str| {
            inner
                .iter()
                .map(Self::describe)
                .collect::<Vec<_>>()
                .join(sep)
        };
        match self {
            Self::Holds(fact) => fact.to_string(),
            Self::OutputNonEmpty(cmd) => format!("output of `{cmd}`"),
            Self::OutputEquals { command, expected } => {
                format!("`{command}` == {expected:?}")
            }
            Self::OutputContains { command, needle } => {
                format!("`{command}` contains {needle:?}")
            }
            Self::VersionInstalled { command, version } => {
                format!("{version} in `{command}`")
            }
            Self::All(inner) => format!("all({})", join(inner, ", ")),
            Self::Any(inner) => format!("any({})", join(inner, ", ")),
            Self::Not(inner) => format!("not {}", inner.describe()),
            Self::Check { label, .. } => label.clone(),
        }
    }
}
