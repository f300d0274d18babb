//! Read-only host facts and their per-step memoisation.
//!
//! A [`Fact`] names one observable property of the host. A [`FactProbe`]
//! evaluates it; [`FactResults`] wraps a probe for the duration of a single
//! precondition check so every fact is probed at most once, and nothing is
//! carried over to the next step.
mod probe;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub use probe::SystemFactProbe;

/// A named, read-only query against the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fact {
    /// A non-directory entry (file or symlink) exists at the path.
    FileExists(PathBuf),
    /// A directory exists at the path.
    DirectoryExists(PathBuf),
    /// An executable with this name is on the search path.
    BinaryOnPath(String),
    /// Trimmed stdout of a shell command that exits zero.
    CommandOutput(String),
    /// Installed versions reported by a shell command, one per line.
    InstalledVersions(String),
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileExists(p) => write!(f, "file {}", p.display()),
            Self::DirectoryExists(p) => write!(f, "directory {}", p.display()),
            Self::BinaryOnPath(name) => write!(f, "binary {name}"),
            Self::CommandOutput(cmd) => write!(f, "output of `{cmd}`"),
            Self::InstalledVersions(cmd) => write!(f, "versions from `{cmd}`"),
        }
    }
}

/// Outcome of evaluating a [`Fact`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactResult {
    /// The property holds and carries no value.
    Present,
    /// The property does not hold, or could not be observed.
    Absent,
    /// The property holds with a captured value.
    Value(String),
}

impl FactResult {
    /// `true` unless [`FactResult::Absent`].
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Captured value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Value(v) => Some(v),
            Self::Present | Self::Absent => None,
        }
    }
}

/// Evaluates facts against a host.
///
/// Probing must not change host state. Errors are folded into
/// [`FactResult::Absent`] rather than surfaced.
#[cfg_attr(test, mockall::automock)]
pub trait FactProbe: Send + Sync {
    /// Evaluate one fact.
    fn evaluate(&self, fact: &Fact) -> FactResult;
}

/// Lazily evaluated, memoised facts for one precondition check.
///
/// Create one per step; each distinct fact hits the probe at most once.
pub struct FactResults<'a> {
    probe: &'a dyn FactProbe,
    cache: RefCell<HashMap<Fact, FactResult>>,
}

impl fmt::Debug for FactResults<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactResults")
            .field("evaluated", &self.cache.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<'a> FactResults<'a> {
    /// An empty result set backed by `probe`.
    #[must_use]
    pub fn new(probe: &'a dyn FactProbe) -> Self {
        Self {
            probe,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Evaluate `fact`, consulting the probe only on first request.
    pub fn get(&self, fact: &Fact) -> FactResult {
        if let Some(hit) = self.cache.borrow().get(fact) {
            return hit.clone();
        }
        let result = self.probe.evaluate(fact);
        self.cache.borrow_mut().insert(fact.clone(), result.clone());
        result
    }

    /// Whether a file (or symlink) exists at `path`.
    pub fn file_exists(&self, path: impl AsRef<Path>) -> bool {
        self.get(&Fact::FileExists(path.as_ref().to_path_buf()))
            .is_present()
    }

    /// Whether a directory exists at `path`.
    pub fn directory_exists(&self, path: impl AsRef<Path>) -> bool {
        self.get(&Fact::DirectoryExists(path.as_ref().to_path_buf()))
            .is_present()
    }

    /// Whether `name` resolves on the search path.
    pub fn binary_on_path(&self, name: &str) -> bool {
        self.get(&Fact::BinaryOnPath(name.to_string())).is_present()
    }

    /// Trimmed output of `command`, or `None` if it failed.
    pub fn command_output(&self, command: &str) -> Option<String> {
        self.get(&Fact::CommandOutput(command.to_string()))
            .value()
            .map(str::to_string)
    }

    /// Versions listed by `command`, one per non-empty line.
    pub fn installed_versions(&self, command: &str) -> Vec<String> {
        self.get(&Fact::InstalledVersions(command.to_string()))
            .value()
            .map(|v| {
                v.lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of distinct facts evaluated so far.
    #[must_use]
    pub fn evaluated(&self) -> usize {
        self.cache.borrow().len()
    }
}
