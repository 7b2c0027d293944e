//! The configuration-to-object adapter: devices and their actions.
use crate::action::{self, ActionHandle};
use crate::cache::ActionCache;
use crate::config::ConfigRoot;
use crate::device::{self, Device, DeviceIter};
use crate::error::{ConnectablesError, Result};

/// Entry point for hosts: owns the configuration root and the action cache.
///
/// Construct one per activation of the integration; the cache lives exactly
/// as long as the catalog.
#[derive(Debug)]
pub struct Catalog {
    root: ConfigRoot,
    cache: ActionCache,
}

impl Catalog {
    /// Create a catalog over `root` with an empty action cache.
    #[must_use]
    pub fn new(root: ConfigRoot) -> Self {
        let cache = ActionCache::new(root.actions_dir());
        Self { root, cache }
    }

    /// The configuration root this catalog reads from.
    #[must_use]
    pub const fn root(&self) -> &ConfigRoot {
        &self.root
    }

    /// The action cache shared by every lookup through this catalog.
    #[must_use]
    pub const fn cache(&self) -> &ActionCache {
        &self.cache
    }

    /// Enumerate all devices; see [`device::list_devices`].
    #[must_use]
    pub fn devices(&self) -> DeviceIter {
        device::list_devices(&self.root.leafs_dir())
    }

    /// Load a single device by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectablesError::NotFound`] if no such device file exists,
    /// or the device's load error.
    pub fn device(&self, id: &str) -> Result<Device> {
        device::find_device(&self.root.leafs_dir(), id)
    }

    /// One handle per action the device declares, in declared order.
    #[must_use]
    pub fn actions_of(&self, device: &Device) -> Vec<ActionHandle> {
        action::actions_of(device, &self.cache)
    }

    /// The handle for action `name` of `device`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectablesError::UnknownAction`] if the device does not
    /// list `name` in its `actions`.
    pub fn action(&self, device: &Device, name: &str) -> Result<ActionHandle> {
        if !device.action_names().contains(&name) {
            return Err(ConnectablesError::UnknownAction {
                device: device.id().to_string(),
                action: name.to_string(),
            });
        }
        Ok(ActionHandle::new(
            name,
            device,
            action::resolve_definition(&self.cache, name),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::fs;

    fn catalog() -> (Catalog, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let root = ConfigRoot::new(tmp.path());
        fs::create_dir_all(root.leafs_dir()).unwrap();
        fs::create_dir_all(root.actions_dir()).unwrap();
        fs::write(
            root.leafs_dir().join("nas.yaml"),
            "actions: [ssh, web]\nhost: nas.local\n",
        )
        .unwrap();
        fs::write(
            root.actions_dir().join("ssh.yaml"),
            "type: command\nname: SSH\ncmd: ssh %(host)s\n",
        )
        .unwrap();
        (Catalog::new(root), tmp)
    }

    #[test]
    fn devices_come_from_leafs_dir() {
        let (catalog, _tmp) = catalog();
        let devices: Vec<Device> = catalog.devices().map(Result::unwrap).collect();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].id(), "nas");
    }

    #[test]
    fn actions_resolve_from_actions_dir() {
        let (catalog, _tmp) = catalog();
        let device = catalog.device("nas").unwrap();
        let actions = catalog.actions_of(&device);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].display_name(), "SSH");
        assert_eq!(actions[1].display_name(), "Unknown");
        assert_eq!(catalog.cache().len(), 1);
    }

    #[test]
    fn action_lookup_requires_declaration() {
        let (catalog, _tmp) = catalog();
        let device = catalog.device("nas").unwrap();
        assert_eq!(catalog.action(&device, "ssh").unwrap().name(), "ssh");
        assert!(matches!(
            catalog.action(&device, "reboot").unwrap_err(),
            ConnectablesError::UnknownAction { .. }
        ));
    }
}
