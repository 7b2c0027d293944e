//! Top-level subcommand orchestration.
pub mod actions;
pub mod check;
pub mod list;
pub mod run;

use crate::catalog::Catalog;
use crate::cli::GlobalOpts;
use crate::config::ConfigRoot;
use crate::logging::Logger;

/// Resolve the configuration root and open a catalog over it.
#[must_use]
pub fn open_catalog(global: &GlobalOpts, log: &Logger) -> Catalog {
    let root = ConfigRoot::resolve(global.config_root.as_deref());
    log.debug(&format!("config root: {}", root.dir().display()));
    if !root.leafs_dir().is_dir() {
        log.warn(&format!(
            "no device directory at {}",
            root.leafs_dir().display()
        ));
    }
    Catalog::new(root)
}

/// Render rows as left-aligned, two-space separated columns.
///
/// The last column is never padded.
pub(crate) fn render_columns(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header_row: Vec<String> = header.iter().map(ToString::to_string).collect();
    let mut out = String::new();
    for row in std::iter::once(&header_row).chain(rows) {
        let last = row.len().saturating_sub(1);
        let mut line = String::new();
        for (i, (cell, width)) in row.iter().zip(&widths).enumerate() {
            if i == last {
                line.push_str(cell);
            } else {
                let pad = width.saturating_sub(cell.chars().count());
                line.push_str(cell);
                line.push_str(&" ".repeat(pad + 2));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
