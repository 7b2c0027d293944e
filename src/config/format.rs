//! Structured-data file parsing (YAML and TOML) into attribute mappings.
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{ConnectablesError, Result};

/// Format-neutral, string-keyed attribute mapping read from a data file.
pub type Attributes = serde_json::Map<String, Value>;

/// Supported structured-data formats, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// `.yaml` / `.yml`
    Yaml,
    /// `.toml`
    Toml,
}

impl DataFormat {
    /// Recognised extensions in lookup priority order.
    pub const EXTENSIONS: &'static [(&'static str, Self)] =
        &[("yaml", Self::Yaml), ("yml", Self::Yaml), ("toml", Self::Toml)];

    /// Detect the format of `path` from its extension (case-insensitive).
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::EXTENSIONS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, format)| *format)
    }

    /// Parse `content` into a top-level mapping.
    ///
    /// Blank documents (including comment-only YAML) yield an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns the parser's diagnostic if the content is not valid, or if the
    /// top-level value is not a mapping.
    pub fn parse_mapping(self, content: &str) -> std::result::Result<Attributes, String> {
        let blank = content
            .lines()
            .map(str::trim)
            .all(|line| line.is_empty() || line.starts_with('#'));
        if blank {
            return Ok(Attributes::new());
        }
        let value: Value = match self {
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string())?,
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string())?,
        };
        match value {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Attributes::new()),
            other => Err(format!(
                "top level must be a mapping, found {}",
                value_kind(&other)
            )),
        }
    }

    /// Serialize `attributes` in this format.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectablesError::Serialize`] for values the format cannot
    /// express (e.g. nulls in TOML).
    pub fn to_string(self, attributes: &Attributes) -> Result<String> {
        match self {
            Self::Yaml => serde_yaml::to_string(attributes)
                .map_err(|e| ConnectablesError::Serialize(e.to_string())),
            Self::Toml => toml::to_string(attributes)
                .map_err(|e| ConnectablesError::Serialize(e.to_string())),
        }
    }
}

/// Short name of a JSON value's type, for diagnostics.
pub(crate) const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Read and parse the data file at `path`.
///
/// # Errors
///
/// - [`ConnectablesError::NotFound`] if the file does not exist
/// - [`ConnectablesError::Io`] for any other read failure
/// - [`ConnectablesError::Parse`] for an unsupported extension, invalid
///   syntax, or a non-mapping top level
pub fn load_mapping(path: &Path) -> Result<Attributes> {
    let format = DataFormat::from_path(path)
        .ok_or_else(|| ConnectablesError::parse(path, "unsupported file extension"))?;
    let content = fs::read_to_string(path).map_err(|e| ConnectablesError::from_io(path, e))?;
    format
        .parse_mapping(&content)
        .map_err(|message| ConnectablesError::parse(path, message))
}

/// Find `<dir>/<stem>.<ext>` for the first recognised extension that exists.
///
/// A stem that is empty, `.`/`..`, or contains a path separator never
/// matches, so lookups cannot leave `dir`.
#[must_use]
pub fn find_data_file(dir: &Path, stem: &str) -> Option<PathBuf> {
    if !is_plain_identifier(stem) {
        return None;
    }
    DataFormat::EXTENSIONS
        .iter()
        .map(|(ext, _)| dir.join(format!("{stem}.{ext}")))
        .find(|path| path.is_file())
}

fn is_plain_identifier(stem: &str) -> bool {
    !matches!(stem, "" | "." | "..") && !stem.contains(['/', '\\'])
}
