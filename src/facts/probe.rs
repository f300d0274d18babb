use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use super::{Fact, FactProbe, FactResult};
use crate::exec::Executor;

/// [`FactProbe`] that inspects the real host.
///
/// Filesystem facts read metadata directly; command facts run through the
/// [`Executor`] via `sh -c`.
#[derive(Debug)]
pub struct SystemFactProbe {
    executor: Arc<dyn Executor>,
    search_path: Option<OsString>,
}

impl SystemFactProbe {
    /// Probe using the process `PATH` for binary lookups.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            search_path: None,
        }
    }

    /// Probe resolving binaries against `search_path` instead of `PATH`.
    #[must_use]
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    fn run(&self, command: &str) -> Option<String> {
        let result = self.executor.run_unchecked("sh", &["-c", command]).ok()?;
        result.success.then(|| result.stdout.trim().to_string())
    }

    fn binary(&self, name: &str) -> bool {
        match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_default();
                which::which_in(name, Some(paths), cwd).is_ok()
            }
            None => which::which(name).is_ok(),
        }
    }
}

fn file_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| !m.is_dir())
}

impl FactProbe for SystemFactProbe {
    fn evaluate(&self, fact: &Fact) -> FactResult {
        let present = |hit: bool| {
            if hit {
                FactResult::Present
            } else {
                FactResult::Absent
            }
        };
        match fact {
            Fact::FileExists(path) => present(file_exists(path)),
            Fact::DirectoryExists(path) => present(path.is_dir()),
            Fact::BinaryOnPath(name) => present(self.binary(name)),
            Fact::CommandOutput(cmd) => self.run(cmd).map_or(FactResult::Absent, FactResult::Value),
            Fact::InstalledVersions(cmd) => self
                .run(cmd)
                .filter(|out| !out.is_empty())
                .map_or(FactResult::Absent, FactResult::Value),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::SystemExecutor;
    use std::fs;

    fn probe() -> SystemFactProbe {
        SystemFactProbe::new(Arc::new(SystemExecutor))
    }

    #[test]
    fn file_and_directory_facts() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("VERSION");
        let p = probe();
        assert_eq!(p.evaluate(&Fact::FileExists(file.clone())), FactResult::Absent);
        fs::write(&file, "2.6").unwrap();
        assert_eq!(p.evaluate(&Fact::FileExists(file.clone())), FactResult::Present);
        assert_eq!(
            p.evaluate(&Fact::DirectoryExists(dir.path().to_path_buf())),
            FactResult::Present
        );
        assert_eq!(p.evaluate(&Fact::FileExists(dir.path().to_path_buf())), FactResult::Absent);
        assert_eq!(p.evaluate(&Fact::DirectoryExists(file)), FactResult::Absent);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_counts_as_file() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("kitty");
        std::os::unix::fs::symlink("/nonexistent/kitty", &link).unwrap();
        assert_eq!(probe().evaluate(&Fact::FileExists(link)), FactResult::Present);
    }

    #[cfg(unix)]
    #[test]
    fn binary_resolved_against_search_path() {
        use std::os::unix::fs::PermissionsExt as _;
        let dir = tempfile::tempdir().unwrap();
        let p = probe().with_search_path(dir.path().as_os_str());
        let fact = Fact::BinaryOnPath("fake-tool-xyz".to_string());
        assert_eq!(p.evaluate(&fact), FactResult::Absent);

        let bin = dir.path().join("fake-tool-xyz");
        fs::write(&bin, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(p.evaluate(&fact), FactResult::Present);
    }

    #[test]
    fn command_output_is_trimmed() {
        let fact = Fact::CommandOutput("printf '  3.10.0 \\n'".to_string());
        assert_eq!(probe().evaluate(&fact), FactResult::Value("3.10.0".to_string()));
    }

    #[test]
    fn empty_output_of_successful_command_is_a_value() {
        let fact = Fact::CommandOutput("true".to_string());
        assert_eq!(probe().evaluate(&fact), FactResult::Value(String::new()));
    }

    #[test]
    fn failing_command_is_absent() {
        let fact = Fact::CommandOutput("echo partial; exit 1".to_string());
        assert_eq!(probe().evaluate(&fact), FactResult::Absent);
    }

    #[test]
    fn installed_versions_empty_is_absent() {
        assert_eq!(
            probe().evaluate(&Fact::InstalledVersions("true".to_string())),
            FactResult::Absent
        );
        assert_eq!(
            probe().evaluate(&Fact::InstalledVersions("echo 3.9.9".to_string())),
            FactResult::Value("3.9.9".to_string())
        );
    }
}
