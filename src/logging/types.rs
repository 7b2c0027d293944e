//! Core logging types: check entries, status, and the [`Log`] trait.

/// Result of checking one device or action, for summary reporting.
#[derive(Debug, Clone)]
pub struct CheckEntry {
    /// What was checked (e.g. `nas` or `nas → mount`).
    pub name: String,
    /// Outcome of the check.
    pub status: CheckStatus,
    /// Optional detail message (e.g. the error description).
    pub message: Option<String>,
}

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Everything resolved and rendered.
    Ok,
    /// Usable, but degraded (e.g. falls back to a default action definition).
    Warning,
    /// Unusable: parse error, unresolved template key, missing template.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) implements this trait; collaborators
/// such as the dry-run launcher log through it without knowing how output
/// is routed.
pub trait Log: Send + Sync + std::fmt::Debug {
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
    /// Record a check result for the summary.
    fn record_check(&self, name: &str, status: CheckStatus, message: Option<&str>);
}
