//! Modification-time cache for parsed action definition files.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use crate::config::{Attributes, find_data_file, load_mapping};
use crate::error::{ConnectablesError, Result};

/// A parsed action file together with the stamp it was read at.
#[derive(Debug, Clone)]
struct CacheEntry {
    path: PathBuf,
    modified: SystemTime,
    data: Arc<Attributes>,
}

/// Cache of action mappings keyed by action identifier.
///
/// A file is only (re)parsed when it has never been read, or when its
/// modification time (or resolved path) differs from the cached entry.
/// The lookup and the store are separate critical sections: two threads
/// racing on the same stale entry may both parse the file.
#[derive(Debug)]
pub struct ActionCache {
    directory: PathBuf,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ActionCache {
    /// Create an empty cache over `directory`.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Directory the cache reads action files from.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Return the parsed mapping for action `name`.
    ///
    /// # Errors
    ///
    /// - [`ConnectablesError::NotFound`] if no `<name>.{yaml,yml,toml}` exists
    ///   or `name` is not a plain file stem
    /// - [`ConnectablesError::Parse`] if the file is not a valid mapping
    /// - [`ConnectablesError::Io`] if the file cannot be read or stat'ed
    pub fn get(&self, name: &str) -> Result<Arc<Attributes>> {
        let path = find_data_file(&self.directory, name).ok_or_else(|| {
            ConnectablesError::NotFound {
                path: self.directory.join(format!("{name}.yaml")),
            }
        })?;
        let modified = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| ConnectablesError::from_io(&path, e))?;

        if let Some(entry) = self.lookup(name)
            && entry.path == path
            && entry.modified == modified
        {
            tracing::debug!("action cache hit: {name}");
            return Ok(entry.data);
        }

        tracing::debug!("action cache miss: {name} ({})", path.display());
        let data = Arc::new(load_mapping(&path)?);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                name.to_string(),
                CacheEntry {
                    path,
                    modified,
                    data: Arc::clone(&data),
                },
            );
        Ok(data)
    }

    fn lookup(&self, name: &str) -> Option<CacheEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Return `true` if nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
