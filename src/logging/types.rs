//! The [`Log`] trait shared by the console logger and test doubles.

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) emits through `tracing`; tests use an
/// in-memory recorder. Step and orchestrator code logs through this trait
/// without knowing which backend is attached.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
}
