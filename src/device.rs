//! Device ("leaf") records and directory enumeration.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::config::format::value_kind;
use crate::config::{Attributes, DataFormat, find_data_file, load_mapping};
use crate::error::{ConnectablesError, Result, TemplateError};
use crate::template::substitute;

/// Description template used when a device file has no `descr`.
pub const DEFAULT_DESCRIPTION: &str = "Connectable object %(name)s";

/// Icon used when a device file has no `icon_name`.
pub const DEFAULT_ICON: &str = "system";

/// A user-configured connectable device.
///
/// The attribute mapping is the file's contents merged over the defaults
/// `name = <id>`, `descr` = [`DEFAULT_DESCRIPTION`], `icon_name` =
/// [`DEFAULT_ICON`]. It is shared (via [`Arc`]) with every action handle
/// produced for this device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    id: String,
    attributes: Arc<Attributes>,
}

impl Device {
    /// Build a device from an already-parsed mapping.
    ///
    /// # Errors
    ///
    /// Returns a diagnostic if `actions` is absent or not a sequence of
    /// strings, or if `descr` / `icon_name` are present but not strings.
    pub fn from_mapping(id: &str, data: Attributes) -> std::result::Result<Self, String> {
        match data.get("actions") {
            None => return Err("missing required key 'actions'".to_string()),
            Some(Value::Array(items)) => {
                if let Some(bad) = items.iter().find(|v| !v.is_string()) {
                    return Err(format!(
                        "'actions' entries must be strings, found {}",
                        value_kind(bad)
                    ));
                }
            }
            Some(other) => {
                return Err(format!(
                    "'actions' must be a sequence, found {}",
                    value_kind(other)
                ));
            }
        }
        for key in ["descr", "icon_name"] {
            if let Some(value) = data.get(key)
                && !value.is_string()
            {
                return Err(format!("'{key}' must be a string, found {}", value_kind(value)));
            }
        }

        let mut attributes = Attributes::new();
        attributes.insert("name".to_string(), Value::from(id));
        attributes.insert("descr".to_string(), Value::from(DEFAULT_DESCRIPTION));
        attributes.insert("icon_name".to_string(), Value::from(DEFAULT_ICON));
        attributes.extend(data);

        Ok(Self {
            id: id.to_string(),
            attributes: Arc::new(attributes),
        })
    }

    /// Load the device file at `path`; the identifier is the file stem.
    ///
    /// # Errors
    ///
    /// Propagates [`load_mapping`] errors and reports an invalid device
    /// mapping as [`ConnectablesError::Parse`].
    pub fn load(path: &Path) -> Result<Self> {
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ConnectablesError::parse(path, "file name is not valid UTF-8"))?;
        let data = load_mapping(path)?;
        Self::from_mapping(id, data).map_err(|message| ConnectablesError::parse(path, message))
    }

    /// Identifier derived from the file name.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Merged attribute mapping used for template substitution.
    #[must_use]
    pub const fn attributes(&self) -> &Arc<Attributes> {
        &self.attributes
    }

    /// Display name: the `name` attribute when it is a string, else the id.
    #[must_use]
    pub fn name(&self) -> &str {
        self.str_attr("name").unwrap_or(&self.id)
    }

    /// Render the device's `descr` template against its own attributes.
    ///
    /// # Errors
    ///
    /// Propagates [`TemplateError`]s, including `MissingKey`.
    pub fn description(&self) -> std::result::Result<String, TemplateError> {
        substitute(
            self.str_attr("descr").unwrap_or(DEFAULT_DESCRIPTION),
            &self.attributes,
        )
    }

    /// Icon name for the host's icon lookup.
    #[must_use]
    pub fn icon_name(&self) -> &str {
        self.str_attr("icon_name").unwrap_or(DEFAULT_ICON)
    }

    /// Action identifiers in declared order.
    #[must_use]
    pub fn action_names(&self) -> Vec<&str> {
        self.attributes
            .get("actions")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    fn str_attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }
}

/// Lazy iterator over the device files of a directory.
///
/// Each call to `next` parses one file. A file that fails to load yields a
/// single `Err` item and enumeration continues with the remaining files.
/// Order follows the filesystem and is not stable.
#[derive(Debug)]
pub struct DeviceIter {
    dir: PathBuf,
    entries: Option<fs::ReadDir>,
    pending: Option<ConnectablesError>,
}

impl Iterator for DeviceIter {
    type Item = Result<Device>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending.take() {
            return Some(Err(err));
        }
        let entries = self.entries.as_mut()?;
        for entry in entries.by_ref() {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => return Some(Err(ConnectablesError::from_io(&self.dir, e))),
            };
            if is_device_file(&path) {
                return Some(Device::load(&path));
            }
        }
        None
    }
}

/// Visible, regular files with a recognised data extension.
fn is_device_file(path: &Path) -> bool {
    let visible = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| !n.starts_with('.'));
    visible && path.is_file() && DataFormat::from_path(path).is_some()
}

/// Enumerate the devices configured in `dir` (non-recursive).
///
/// A missing directory is an empty listing. Re-enumerating re-reads the
/// directory and every file.
#[must_use]
pub fn list_devices(dir: &Path) -> DeviceIter {
    let (entries, pending) = match fs::read_dir(dir) {
        Ok(entries) => (Some(entries), None),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("device directory missing: {}", dir.display());
            (None, None)
        }
        Err(e) => (None, Some(ConnectablesError::from_io(dir, e))),
    };
    DeviceIter {
        dir: dir.to_path_buf(),
        entries,
        pending,
    }
}

/// Load the single device `id` from `dir`.
///
/// # Errors
///
/// Returns [`ConnectablesError::NotFound`] if no file for `id` exists or `id`
/// is not a plain file stem, or any error from [`Device::load`].
pub fn find_device(dir: &Path, id: &str) -> Result<Device> {
    let path = find_data_file(dir, id).ok_or_else(|| ConnectablesError::NotFound {
        path: dir.join(format!("{id}.yaml")),
    })?;
    Device::load(&path)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => Attributes::new(),
        }
    }

    #[test]
    fn defaults_fill_missing_attributes() {
        let device = Device::from_mapping("nas", mapping(json!({"actions": []}))).unwrap();
        assert_eq!(device.name(), "nas");
        assert_eq!(device.icon_name(), DEFAULT_ICON);
        assert_eq!(device.description().unwrap(), "Connectable object nas");
    }

    #[test]
    fn file_values_override_defaults() {
        let device = Device::from_mapping(
            "nas",
            mapping(json!({
                "actions": ["mount"],
                "name": "Home NAS",
                "descr": "%(name)s at %(host)s",
                "icon_name": "network-server",
                "host": "10.0.0.2",
            })),
        )
        .unwrap();
        assert_eq!(device.id(), "nas");
        assert_eq!(device.name(), "Home NAS");
        assert_eq!(device.icon_name(), "network-server");
        assert_eq!(device.description().unwrap(), "Home NAS at 10.0.0.2");
        assert_eq!(device.action_names(), vec!["mount"]);
    }

    #[test]
    fn description_with_unknown_key_fails() {
        let device = Device::from_mapping(
            "nas",
            mapping(json!({"actions": [], "descr": "share %(share)s"})),
        )
        .unwrap();
        assert_eq!(
            device.description().unwrap_err(),
            TemplateError::MissingKey {
                key: "share".to_string()
            }
        );
    }

    #[test]
    fn actions_key_is_required() {
        let err = Device::from_mapping("nas", mapping(json!({"host": "x"}))).unwrap_err();
        assert!(err.contains("actions"));
    }

    #[test]
    fn actions_must_be_strings() {
        let err = Device::from_mapping("nas", mapping(json!({"actions": "ssh"}))).unwrap_err();
        assert!(err.contains("sequence"));
        let err = Device::from_mapping("nas", mapping(json!({"actions": ["ssh", 3]}))).unwrap_err();
        assert!(err.contains("number"));
    }

    #[test]
    fn descr_must_be_a_string() {
        let err =
            Device::from_mapping("nas", mapping(json!({"actions": [], "descr": 5}))).unwrap_err();
        assert!(err.contains("descr"));
    }

    #[test]
    fn load_uses_file_stem_as_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("office-vpn.yaml");
        fs::write(&path, "actions: [connect]\n").unwrap();
        let device = Device::load(&path).unwrap();
        assert_eq!(device.id(), "office-vpn");
        assert_eq!(device.attributes()["name"], json!("office-vpn"));
    }

    #[test]
    fn load_reports_invalid_device_as_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nas.yaml");
        fs::write(&path, "host: nas\n").unwrap();
        let err = Device::load(&path).unwrap_err();
        assert!(matches!(err, ConnectablesError::Parse { .. }));
    }

    #[test]
    fn listing_skips_non_data_and_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("nas.yaml"), "actions: []\n").unwrap();
        fs::write(dir.path().join("vpn.toml"), "actions = []\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a device").unwrap();
        fs::write(dir.path().join(".draft.yaml"), "actions: []\n").unwrap();
        fs::create_dir(dir.path().join("nested.yaml")).unwrap();

        let mut ids: Vec<String> = list_devices(dir.path())
            .map(|d| d.unwrap().id().to_string())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["nas", "vpn"]);
    }

    #[test]
    fn listing_isolates_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.yaml"), "actions: [ssh]\n").unwrap();
        fs::write(dir.path().join("bad.yaml"), "actions: [ssh\n").unwrap();

        let results: Vec<Result<Device>> = list_devices(dir.path()).collect();
        assert_eq!(results.len(), 2);
        let good: Vec<&Device> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(good.len(), 1);
        assert_eq!(good[0].id(), "good");
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(list_devices(&dir.path().join("absent")).count(), 0);
    }

    #[test]
    fn listing_is_restartable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("nas.yaml"), "actions: []\n").unwrap();
        assert_eq!(list_devices(dir.path()).count(), 1);
        fs::write(dir.path().join("vpn.yaml"), "actions: []\n").unwrap();
        assert_eq!(list_devices(dir.path()).count(), 2);
    }

    #[test]
    fn find_device_by_id() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("nas.yml"), "actions: [ssh]\n").unwrap();
        assert_eq!(find_device(dir.path(), "nas").unwrap().id(), "nas");
        assert!(find_device(dir.path(), "vpn").unwrap_err().is_not_found());
    }

    #[test]
    fn find_device_rejects_path_like_ids() {
        let root = tempfile::tempdir().unwrap();
        let leafs = root.path().join("leafs");
        fs::create_dir_all(&leafs).unwrap();
        fs::write(root.path().join("outside.yaml"), "actions: []\n").unwrap();

        let err = find_device(&leafs, "../outside").unwrap_err();
        assert!(err.is_not_found());
    }
}
