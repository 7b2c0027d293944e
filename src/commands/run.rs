//! `run`: activate one action of a device.
use anyhow::{Context as _, Result};

use crate::action::Dispatch;
use crate::catalog::Catalog;
use crate::cli::{GlobalOpts, RunOpts};
use crate::exec::{DryRunLauncher, Launcher, SystemLauncher};
use crate::logging::Logger;

/// Activate `action` of `device` through `launcher`.
///
/// # Errors
///
/// Returns an error if the device cannot be loaded, does not declare the
/// action, or the action cannot be dispatched.
pub fn activate(
    catalog: &Catalog,
    device: &str,
    action: &str,
    launcher: &dyn Launcher,
) -> Result<Dispatch> {
    let device = catalog
        .device(device)
        .with_context(|| format!("loading device '{device}'"))?;
    let handle = catalog.action(&device, action)?;
    handle
        .activate(launcher)
        .with_context(|| format!("activating '{action}' on '{}'", device.id()))
}

/// Run the run command.
///
/// # Errors
///
/// Returns an error if activation fails.
pub fn run(global: &GlobalOpts, opts: &RunOpts, log: &Logger) -> Result<()> {
    let catalog = super::open_catalog(global, log);
    let dispatch = if global.dry_run {
        activate(&catalog, &opts.device, &opts.action, &DryRunLauncher::new(log))?
    } else {
        activate(&catalog, &opts.device, &opts.action, &SystemLauncher)?
    };

    match &dispatch {
        Dispatch::Ignored { kind } => log.warn(&format!(
            "{} → {}: type '{kind}' does nothing",
            opts.device, opts.action
        )),
        other if !global.dry_run => log.info(&format!("{} → {}: {other}", opts.device, opts.action)),
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::ConfigRoot;
    use crate::error::ConnectablesError;
    use crate::exec::MockLauncher;
    use std::fs;

    fn catalog() -> (Catalog, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let root = ConfigRoot::new(tmp.path());
        fs::create_dir_all(root.leafs_dir()).unwrap();
        fs::create_dir_all(root.actions_dir()).unwrap();
        fs::write(
            root.leafs_dir().join("printer.yaml"),
            "actions: [web, ping]\nhost: 10.0.0.7\n",
        )
        .unwrap();
        fs::write(
            root.actions_dir().join("web.yaml"),
            "type: uri\nuri: https://%(host)s/admin\n",
        )
        .unwrap();
        (Catalog::new(root), tmp)
    }

    #[test]
    fn uri_action_goes_to_opener() {
        let (catalog, _tmp) = catalog();
        let mut launcher = MockLauncher::new();
        launcher
            .expect_open_uri()
            .withf(|uri| uri == "https://10.0.0.7/admin")
            .times(1)
            .returning(|_| Ok(()));
        launcher.expect_launch_command().never();

        let dispatch = activate(&catalog, "printer", "web", &launcher).unwrap();
        assert_eq!(
            dispatch,
            Dispatch::Uri {
                uri: "https://10.0.0.7/admin".to_string()
            }
        );
    }

    #[test]
    fn missing_action_file_dispatches_nothing() {
        let (catalog, _tmp) = catalog();
        let mut launcher = MockLauncher::new();
        launcher.expect_open_uri().never();
        launcher.expect_launch_command().never();

        let dispatch = activate(&catalog, "printer", "ping", &launcher).unwrap();
        assert!(matches!(dispatch, Dispatch::Ignored { kind } if kind == "unknown"));
    }

    #[test]
    fn undeclared_action_is_rejected() {
        let (catalog, _tmp) = catalog();
        let launcher = MockLauncher::new();
        let err = activate(&catalog, "printer", "reboot", &launcher).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConnectablesError>(),
            Some(ConnectablesError::UnknownAction { .. })
        ));
    }

    #[test]
    fn unknown_device_is_reported() {
        let (catalog, _tmp) = catalog();
        let launcher = MockLauncher::new();
        let err = activate(&catalog, "scanner", "web", &launcher).unwrap_err();
        assert!(err.to_string().contains("scanner"));
        assert!(
            err.downcast_ref::<ConnectablesError>()
                .is_some_and(ConnectablesError::is_not_found)
        );
    }
}
