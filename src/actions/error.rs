//! Typed failures raised by action primitives.
use std::path::Path;

use thiserror::Error;

/// Why an action could not bring the host into the requested state.
#[derive(Error, Debug)]
pub enum ActionError {
    /// The process could not be spawned at all.
    #[error("could not start `{command}`: {reason}")]
    Spawn {
        /// Command line that failed to start.
        command: String,
        /// Underlying spawn error.
        reason: String,
    },

    /// The process ran and exited unsuccessfully.
    #[error("command `{command}` failed ({status}): {output}")]
    CommandFailed {
        /// Command line that failed.
        command: String,
        /// Rendered exit status, e.g. `exit 1`.
        status: String,
        /// Combined stdout and stderr.
        output: String,
    },

    /// Fetching a URL failed.
    #[error("download of {url} failed: {reason}")]
    Download {
        /// Source URL.
        url: String,
        /// Transport or HTTP error.
        reason: String,
    },

    /// A downloaded file did not match its pinned digest.
    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Path of the downloaded file.
        path: String,
        /// Pinned SHA-256 digest.
        expected: String,
        /// Digest of the received bytes.
        actual: String,
    },

    /// A filesystem operation failed.
    #[error("{operation} {path}: {source}")]
    Io {
        /// What was being attempted, e.g. `create directory`.
        operation: &'static str,
        /// Path involved.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A symlink was requested where a regular file or directory lives.
    #[error("refusing to replace {kind} at {path} with a symlink")]
    RefusedReplace {
        /// Path of the existing entry.
        path: String,
        /// `file` or `directory`.
        kind: &'static str,
    },

    /// A directory was requested where a non-directory entry lives.
    #[error("{path} exists and is not a directory")]
    NotADirectory {
        /// Offending path.
        path: String,
    },

    /// Cloning a repository failed.
    #[error("clone of {url} failed: {reason}")]
    Clone {
        /// Repository URL.
        url: String,
        /// libgit2 error message.
        reason: String,
    },

    /// No usable package manager for the request.
    #[error("package manager {manager} is not available on this host")]
    ManagerUnavailable {
        /// Manager that was looked for.
        manager: String,
    },
}

impl ActionError {
    /// Wrap an I/O error with the operation and path it concerns.
    pub(crate) fn io(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.display().to_string(),
            source,
        }
    }
}

/// Render an exit code the way failure messages show it.
pub(crate) fn describe_status(code: Option<i32>) -> String {
    code.map_or_else(|| "terminated by signal".to_string(), |c| format!("exit {c}"))
}
