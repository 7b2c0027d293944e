//! Domain-specific error types for the connectables engine.
//!
//! Library modules return [`ConnectablesError`] (and [`TemplateError`] from
//! substitution) while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ConnectablesError
//! ├── NotFound         missing device or action file
//! ├── Parse            malformed structured data
//! ├── Io               any other read failure
//! ├── Template(TemplateError)
//! │   ├── MissingKey   placeholder names an undefined attribute
//! │   ├── NotAnInteger
//! │   └── Malformed
//! ├── MissingField     action type without its `cmd` / `uri`
//! ├── UnknownAction    device does not declare the requested action
//! ├── Serialize        a mapping could not be written back out
//! └── Launch           host launcher could not be spawned
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for results carrying a [`ConnectablesError`].
pub type Result<T, E = ConnectablesError> = std::result::Result<T, E>;

/// Top-level error type for loading, resolving and dispatching connectables.
#[derive(Error, Debug)]
pub enum ConnectablesError {
    /// A device or action file does not exist.
    #[error("file not found: {}", path.display())]
    NotFound {
        /// Path (or path stem, when several extensions were tried) that was looked up.
        path: PathBuf,
    },

    /// A file exists but its contents are not a valid mapping.
    #[error("failed to parse {}: {message}", path.display())]
    Parse {
        /// Path of the malformed file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// An I/O error other than "not found" occurred while reading a file.
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Template substitution failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// An action of a dispatchable type lacks the field it dispatches.
    #[error("action '{action}' has no '{field}' template")]
    MissingField {
        /// Action identifier.
        action: String,
        /// Name of the missing field (`cmd` or `uri`).
        field: &'static str,
    },

    /// The device does not list the requested action.
    #[error("device '{device}' has no action '{action}'")]
    UnknownAction {
        /// Device identifier.
        device: String,
        /// Requested action identifier.
        action: String,
    },

    /// A mapping could not be serialized in the requested format.
    #[error("failed to serialize mapping: {0}")]
    Serialize(String),

    /// The host launcher could not be started.
    #[error("failed to launch '{target}': {source}")]
    Launch {
        /// Command line or URI that was being dispatched.
        target: String,
        /// Underlying spawn error.
        source: std::io::Error,
    },
}

impl ConnectablesError {
    /// Build a [`ConnectablesError::Parse`] from any displayable parser error.
    pub fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Classify an I/O error for `path`, mapping `NotFound` to its own variant.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Return `true` for [`ConnectablesError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised by `%(key)s` template substitution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A placeholder references a key absent from the attribute mapping.
    #[error("template references undefined key '{key}'")]
    MissingKey {
        /// The undefined key.
        key: String,
    },

    /// A `%(key)d` placeholder was applied to a non-integer value.
    #[error("template key '{key}' is not an integer")]
    NotAnInteger {
        /// The offending key.
        key: String,
    },

    /// The template itself is not well formed.
    #[error("malformed template at byte {position}: {reason}")]
    Malformed {
        /// Byte offset of the offending `%`.
        position: usize,
        /// What is wrong at that position.
        reason: String,
    },
}
