//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{CheckEntry, CheckStatus, Log};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// Messages go through [`tracing`]; the file layer installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) persists them to
/// `$XDG_CACHE_HOME/connectables/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    checks: Mutex<Vec<CheckEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger whose summary points at the log file for `command`.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_file(log_file_path(command))
    }

    /// Create a logger that reports `log_file` in its summary.
    #[must_use]
    pub const fn with_log_file(log_file: Option<PathBuf>) -> Self {
        Self {
            checks: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded check entries.
    #[must_use]
    pub fn check_entries(&self) -> Vec<CheckEntry> {
        self.checks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record a check result for the summary.
    pub fn record_check(&self, name: &str, status: CheckStatus, message: Option<&str>) {
        self.checks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CheckEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
    }

    /// Count the checks recorded with `status`.
    #[must_use]
    pub fn count(&self, status: CheckStatus) -> usize {
        self.checks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|c| c.status == status)
            .count()
    }

    /// Count the number of failed checks.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.count(CheckStatus::Failed)
    }

    /// Log the summary of all recorded checks.
    pub fn print_summary(&self) {
        let checks = self.check_entries();
        if checks.is_empty() {
            return;
        }

        self.stage("Summary");
        for check in &checks {
            let (icon, color) = match check.status {
                CheckStatus::Ok => ("✓", "\x1b[32m"),
                CheckStatus::Warning => ("○", "\x1b[33m"),
                CheckStatus::Failed => ("✗", "\x1b[31m"),
            };
            let suffix = check
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", check.name));
        }

        self.info(&format!(
            "{} checks: \x1b[32m{} ok\x1b[0m, \x1b[33m{} warnings\x1b[0m, \x1b[31m{} failed\x1b[0m",
            checks.len(),
            self.count(CheckStatus::Ok),
            self.count(CheckStatus::Warning),
            self.count(CheckStatus::Failed),
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_check(&self, name: &str, status: CheckStatus, message: Option<&str>) {
        self.record_check(name, status, message);
    }
}
