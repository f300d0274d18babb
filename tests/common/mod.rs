// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed host (a fake home with its own `bin/`
// search path) and helpers to load plans against it, so each integration test
// can run real steps without touching the machine it runs on.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use provision_cli::config::{self, Plan, toml_loader};
use provision_cli::exec::{Executor, SystemExecutor};
use provision_cli::facts::SystemFactProbe;
use provision_cli::logging::Log;
use provision_cli::orchestrator::{self, ProvisioningReport};
use provision_cli::platform::{Distro, Os, Platform};
use provision_cli::steps::Context;

/// [`Log`] that keeps every message for later assertions.
#[derive(Debug, Default)]
pub struct CollectingLog {
    lines: Mutex<Vec<(&'static str, String)>>,
}

impl CollectingLog {
    /// `true` if any message at `level` contains `needle`.
    pub fn contains(&self, level: &str, needle: &str) -> bool {
        self.lines
            .lock()
            .expect("log mutex")
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }

    fn push(&self, level: &'static str, msg: &str) {
        self.lines
            .lock()
            .expect("log mutex")
            .push((level, msg.to_string()));
    }
}

impl Log for CollectingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
}

/// The platform integration tests pretend to run on.
pub fn debian() -> Platform {
    Platform::new(Os::Linux, Distro::Debian)
}

/// An isolated host backed by a [`tempfile::TempDir`].
///
/// `home` stands in for `$HOME` during path expansion and `bin/` under it is
/// the only directory binary facts search.
pub struct TestHost {
    /// Temporary home directory.
    pub home: tempfile::TempDir,
    /// Messages logged by every context built from this host.
    pub log: Arc<CollectingLog>,
}

impl TestHost {
    /// Create a host with an empty `bin/` directory.
    pub fn new() -> Self {
        let home = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(home.path().join("bin")).expect("create bin dir");
        Self {
            home,
            log: Arc::new(CollectingLog::default()),
        }
    }

    /// Path of the fake home directory.
    pub fn home_path(&self) -> &Path {
        self.home.path()
    }

    /// The directory binary facts search.
    pub fn bin_dir(&self) -> PathBuf {
        self.home.path().join("bin")
    }

    /// `path` joined onto the fake home, as a string for plan text.
    pub fn path(&self, relative: &str) -> String {
        self.home.path().join(relative).display().to_string()
    }

    /// Parse and prepare `toml` with this host's home for `~` expansion.
    pub fn load_plan(&self, toml: &str) -> Plan {
        let file = toml_loader::parse_config(toml, "test plan").expect("parse plan");
        let home = self.home_path().display().to_string();
        config::prepare(file, Some(home.as_str()), &debian(), &SystemExecutor)
            .expect("prepare plan")
            .plan
    }

    /// Context that spawns real processes without `sudo` and resolves
    /// binaries against [`bin_dir`](Self::bin_dir) only.
    pub fn context(&self) -> Context {
        let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
        let probe = SystemFactProbe::new(Arc::clone(&executor)).with_search_path(self.bin_dir());
        let log: Arc<dyn Log> = self.log.clone();
        Context::new(Arc::new(debian()), log, executor, false)
            .with_elevation(false)
            .with_probe(Arc::new(probe))
            .with_http(direct_agent())
    }

    /// Run every phase of `plan` on this host.
    pub fn provision(&self, plan: &Plan) -> ProvisioningReport {
        orchestrator::provision(&plan.phases, &self.context())
    }
}

/// HTTP agent that ignores proxy settings from the environment, for talking
/// to local test servers.
pub fn direct_agent() -> ureq::Agent {
    ureq::Agent::config_builder().proxy(None).build().into()
}
