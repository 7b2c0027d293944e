//! `check`: validate every device and action file.
use std::collections::BTreeSet;
use std::fs;

use anyhow::{Result, bail};

use crate::action::{ActionDefinition, ActionHandle, Dispatch};
use crate::catalog::Catalog;
use crate::cli::GlobalOpts;
use crate::config::DataFormat;
use crate::device::Device;
use crate::logging::{CheckStatus, Log, Logger};
use crate::template::placeholders;

/// Validate every device, every action it declares, and flag action files
/// that no device uses. Results are recorded through `log`.
pub fn check_catalog(catalog: &Catalog, log: &dyn Log) {
    let mut used = BTreeSet::new();
    let mut devices = Vec::new();
    for result in catalog.devices() {
        match result {
            Ok(device) => devices.push(device),
            Err(e) => log.record_check("device file", CheckStatus::Failed, Some(&e.to_string())),
        }
    }
    devices.sort_by(|a, b| a.id().cmp(b.id()));

    for device in &devices {
        match device.description() {
            Ok(_) => log.record_check(device.id(), CheckStatus::Ok, None),
            Err(e) => log.record_check(device.id(), CheckStatus::Failed, Some(&e.to_string())),
        }
        for name in device.action_names() {
            used.insert(name.to_string());
            let label = format!("{} → {name}", device.id());
            let (status, message) = check_action(catalog, device, name);
            log.record_check(&label, status, message.as_deref());
        }
    }

    for name in action_files(catalog) {
        if !used.contains(&name) {
            log.record_check(&name, CheckStatus::Warning, Some("not used by any device"));
        }
    }
}

fn check_action(catalog: &Catalog, device: &Device, name: &str) -> (CheckStatus, Option<String>) {
    let definition = match catalog.cache().get(name) {
        Ok(data) => {
            let (definition, problems) = ActionDefinition::from_mapping(name, &data);
            if !problems.is_empty() {
                return (CheckStatus::Failed, Some(problems.join("; ")));
            }
            definition
        }
        Err(e) if e.is_not_found() => {
            return (CheckStatus::Warning, Some("action file missing".to_string()));
        }
        Err(e) => return (CheckStatus::Failed, Some(e.to_string())),
    };

    let undefined = undefined_keys(&definition, device);
    if !undefined.is_empty() {
        return (
            CheckStatus::Failed,
            Some(format!("undefined keys: {}", undefined.join(", "))),
        );
    }

    let handle = ActionHandle::new(name, device, definition);
    if let Err(e) = handle.describe() {
        return (CheckStatus::Failed, Some(format!("descr: {e}")));
    }
    match handle.prepare() {
        Ok(Dispatch::Ignored { kind }) => (
            CheckStatus::Warning,
            Some(format!("type '{kind}' does nothing")),
        ),
        Ok(_) => (CheckStatus::Ok, None),
        Err(e) => (CheckStatus::Failed, Some(e.to_string())),
    }
}

/// Keys referenced by the action's templates that the device does not define.
///
/// Malformed templates are skipped here and reported by rendering.
fn undefined_keys(definition: &ActionDefinition, device: &Device) -> Vec<String> {
    let templates = [
        Some(&definition.descr),
        definition.cmd.as_ref(),
        definition.uri.as_ref(),
    ];
    let mut keys = Vec::<String>::new();
    for template in templates.into_iter().flatten() {
        for key in placeholders(template).unwrap_or_default() {
            if !device.attributes().contains_key(key) && !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
    }
    keys
}

/// Stems of every recognised action file, sorted and deduplicated.
fn action_files(catalog: &Catalog) -> BTreeSet<String> {
    let Ok(entries) = fs::read_dir(catalog.cache().directory()) else {
        return BTreeSet::new();
    };
    entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && DataFormat::from_path(path).is_some())
        .filter_map(|path| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !s.starts_with('.'))
                .map(String::from)
        })
        .collect()
}

/// Run the check command.
///
/// # Errors
///
/// Returns an error if any check failed.
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let catalog = super::open_catalog(global, log);
    log.stage("Checking devices and actions");
    check_catalog(&catalog, log);
    log.print_summary();

    let failed = log.failure_count();
    if failed > 0 {
        bail!("{failed} check(s) failed");
    }
    Ok(())
}
