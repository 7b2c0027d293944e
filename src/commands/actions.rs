//! `actions`: show the actions of one device.
use std::io::Write as _;

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::action::{self, ActionHandle};
use crate::cli::{ActionsOpts, GlobalOpts};
use crate::logging::Logger;

/// One action as shown by `actions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRow {
    /// Action identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Action `type`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Ranking hint.
    pub rank: i64,
    /// Icon name.
    pub icon_name: String,
    /// Rendered description, absent if the template failed.
    pub description: Option<String>,
    /// Template error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionRow {
    /// Summarise `handle`, rendering its description.
    #[must_use]
    pub fn from_handle(handle: &ActionHandle) -> Self {
        let (description, error) = match handle.describe() {
            Ok(text) => (Some(text), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            id: handle.name().to_string(),
            name: handle.display_name().to_string(),
            kind: handle.definition().kind.to_string(),
            rank: handle.rank(),
            icon_name: handle.icon_name().to_string(),
            description,
            error,
        }
    }
}

/// Render action rows as a table.
#[must_use]
pub fn render(rows: &[ActionRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.id.clone(),
                row.name.clone(),
                row.kind.clone(),
                row.rank.to_string(),
                row.description.clone().unwrap_or_else(|| {
                    format!("<{}>", row.error.as_deref().unwrap_or("unavailable"))
                }),
            ]
        })
        .collect();
    super::render_columns(&["ID", "NAME", "TYPE", "RANK", "DESCRIPTION"], &cells)
}

/// Run the actions command.
///
/// # Errors
///
/// Returns an error if the device cannot be loaded or stdout cannot be
/// written.
pub fn run(global: &GlobalOpts, opts: &ActionsOpts, log: &Logger) -> Result<()> {
    let catalog = super::open_catalog(global, log);
    let device = catalog
        .device(&opts.device)
        .with_context(|| format!("loading device '{}'", opts.device))?;

    let mut handles = catalog.actions_of(&device);
    if opts.by_rank {
        handles = action::rank_sorted(handles);
    }
    let rows: Vec<ActionRow> = handles.iter().map(ActionRow::from_handle).collect();
    for row in &rows {
        if let Some(err) = &row.error {
            log.warn(&format!("{} → {}: {err}", device.id(), row.id));
        }
    }

    let mut out = std::io::stdout().lock();
    if opts.json {
        serde_json::to_writer_pretty(&mut out, &rows).context("writing JSON")?;
        writeln!(out)?;
    } else {
        write!(out, "{}", render(&rows))?;
    }
    Ok(())
}
