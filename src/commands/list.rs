//! `list`: enumerate configured devices.
use std::io::Write as _;

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::catalog::Catalog;
use crate::cli::{GlobalOpts, ListOpts};
use crate::device::Device;
use crate::logging::Logger;

/// One device as shown by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRow {
    /// Device identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Rendered description, absent if the template failed.
    pub description: Option<String>,
    /// Template error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Icon name.
    pub icon_name: String,
    /// Declared action identifiers.
    pub actions: Vec<String>,
}

impl DeviceRow {
    fn from_device(device: &Device) -> Self {
        let (description, error) = match device.description() {
            Ok(text) => (Some(text), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            id: device.id().to_string(),
            name: device.name().to_string(),
            description,
            error,
            icon_name: device.icon_name().to_string(),
            actions: device
                .action_names()
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Enumerate every loadable device, sorted by id.
///
/// Files that fail to load are logged as warnings and left out.
#[must_use]
pub fn collect_devices(catalog: &Catalog, log: &Logger) -> Vec<DeviceRow> {
    let mut rows: Vec<DeviceRow> = catalog
        .devices()
        .filter_map(|result| match result {
            Ok(device) => Some(DeviceRow::from_device(&device)),
            Err(e) => {
                log.warn(&format!("skipping device: {e}"));
                None
            }
        })
        .collect();
    rows.sort_by(|a, b| a.id.cmp(&b.id));
    for row in &rows {
        if let Some(err) = &row.error {
            log.warn(&format!("{}: {err}", row.id));
        }
    }
    rows
}

/// Render device rows as a table.
#[must_use]
pub fn render(rows: &[DeviceRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.id.clone(),
                row.actions.join(","),
                row.description
                    .clone()
                    .unwrap_or_else(|| "<description unavailable>".to_string()),
            ]
        })
        .collect();
    super::render_columns(&["ID", "ACTIONS", "DESCRIPTION"], &cells)
}

/// Run the list command.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn run(global: &GlobalOpts, opts: &ListOpts, log: &Logger) -> Result<()> {
    let catalog = super::open_catalog(global, log);
    let rows = collect_devices(&catalog, log);
    log.debug(&format!("{} devices", rows.len()));

    let mut out = std::io::stdout().lock();
    if opts.json {
        serde_json::to_writer_pretty(&mut out, &rows).context("writing JSON")?;
        writeln!(out)?;
    } else {
        write!(out, "{}", render(&rows))?;
    }
    Ok(())
}
