use std::sync::Arc;

use crate::actions::PackageManager;
use crate::actions::download;
use crate::exec::{self, Executor};
use crate::facts::{FactProbe, SystemFactProbe};
use crate::logging::Log;
use crate::platform::Platform;

/// Shared context for step execution.
pub struct Context {
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Logger for step progress and action output.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Fact source for preconditions.
    pub probe: Arc<dyn FactProbe>,
    /// HTTP agent for download actions.
    pub http: ureq::Agent,
    /// Evaluate preconditions but run no actions.
    pub dry_run: bool,
    /// Prefix privileged commands with `sudo` (false when already root).
    pub elevate: bool,
    /// Manager used by `external_packages` actions.
    pub external_manager: PackageManager,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("executor", &self.executor)
            .field("probe", &"<dyn FactProbe>")
            .field("dry_run", &self.dry_run)
            .field("elevate", &self.elevate)
            .field("external_manager", &self.external_manager)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Create a context backed by the real host.
    ///
    /// Facts are probed through `executor`; elevation is enabled unless the
    /// process already runs as root.
    #[must_use]
    pub fn new(
        platform: Arc<Platform>,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        dry_run: bool,
    ) -> Self {
        let elevate = !exec::is_root(executor.as_ref());
        Self {
            platform,
            log,
            probe: Arc::new(SystemFactProbe::new(Arc::clone(&executor))),
            executor,
            http: download::default_agent(),
            dry_run,
            elevate,
            external_manager: PackageManager::Brew,
        }
    }

    /// Replace the fact probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn FactProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Replace the HTTP agent.
    #[must_use]
    pub fn with_http(mut self, http: ureq::Agent) -> Self {
        self.http = http;
        self
    }

    /// Set the manager used for external packages.
    #[must_use]
    pub const fn with_external_manager(mut self, manager: PackageManager) -> Self {
        self.external_manager = manager;
        self
    }

    /// Force or suppress the `sudo` prefix.
    #[must_use]
    pub const fn with_elevation(mut self, elevate: bool) -> Self {
        self.elevate = elevate;
        self
    }
}
