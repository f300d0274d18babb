//! Action primitives: the operations a step performs to change host state.
//!
//! Actions carry no precondition of their own; whether they run at all is
//! decided by the owning step. Each action either succeeds or returns an
//! [`ActionError`] describing what went wrong.
pub mod download;
pub mod error;
pub mod fs;
pub mod git;
pub mod package;
pub mod shell;

use std::path::PathBuf;

pub use error::ActionError;
pub use package::PackageManager;
pub use shell::ShellCommand;

use crate::steps::Context;

/// One state-changing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run a command through `sh -c`.
    RunShell(ShellCommand),
    /// Fetch a URL into a file, overwriting it.
    DownloadFile {
        /// Source URL.
        url: String,
        /// Destination file.
        destination: PathBuf,
        /// Optional pinned SHA-256 digest (hex).
        sha256: Option<String>,
    },
    /// Create a directory (and ancestors) if missing.
    EnsureDirectory(PathBuf),
    /// Point `link` at `target`.
    CreateSymlink {
        /// What the link points at.
        target: PathBuf,
        /// Where the link lives.
        link: PathBuf,
    },
    /// Install packages with the platform's system package manager.
    InstallOsPackages(Vec<String>),
    /// Install packages with the configured external package manager.
    InstallExternalPackages(Vec<String>),
    /// Clone a git repository.
    CloneRepository {
        /// Repository URL.
        url: String,
        /// Checkout directory.
        destination: PathBuf,
    },
    /// Delete a file, symlink or directory tree.
    RemovePath(PathBuf),
}

impl Action {
    /// Human-readable one-line description, used in logs and failure reports.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::RunShell(cmd) => format!("run `{}`", cmd.command),
            Self::DownloadFile {
                url, destination, ..
            } => format!("download {url} -> {}", destination.display()),
            Self::EnsureDirectory(path) => format!("ensure directory {}", path.display()),
            Self::CreateSymlink { target, link } => {
                format!("symlink {} -> {}", link.display(), target.display())
            }
            Self::InstallOsPackages(names) => format!("install os packages: {}", names.join(" ")),
            Self::InstallExternalPackages(names) => {
                format!("install external packages: {}", names.join(" "))
            }
            Self::CloneRepository { url, destination } => {
                format!("clone {url} -> {}", destination.display())
            }
            Self::RemovePath(path) => format!("remove {}", path.display()),
        }
    }

    /// Perform the action.
    ///
    /// `step_privileged` is the owning step's privilege flag; shell commands
    /// inherit it unless they override it.
    ///
    /// # Errors
    ///
    /// Returns the [`ActionError`] of the underlying primitive.
    pub fn execute(&self, step_privileged: bool, ctx: &Context) -> Result<(), ActionError> {
        match self {
            Self::RunShell(cmd) => cmd.run(step_privileged, ctx),
            Self::DownloadFile {
                url,
                destination,
                sha256,
            } => download::download(&ctx.http, url, destination, sha256.as_deref()),
            Self::EnsureDirectory(path) => fs::ensure_directory(path),
            Self::CreateSymlink { target, link } => fs::create_symlink(target, link),
            Self::InstallOsPackages(names) => {
                let manager = ctx.platform.os_package_manager().ok_or_else(|| {
                    ActionError::ManagerUnavailable {
                        manager: format!("for {}/{}", ctx.platform.os, ctx.platform.distro),
                    }
                })?;
                package::install_missing(manager, names, ctx)
            }
            Self::InstallExternalPackages(names) => {
                package::install_missing(ctx.external_manager, names, ctx)
            }
            Self::CloneRepository { url, destination } => git::clone_repository(url, destination),
            Self::RemovePath(path) => fs::remove_path(path),
        }
    }
}
