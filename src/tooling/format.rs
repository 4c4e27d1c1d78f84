//! Human-readable rendering for read-only command output.

use crate::tooling::cli::{LogEntryRow, VerifyReport};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn short(hash: &str) -> String {
    hash.chars().take(7).collect()
}

/// Render the snapshot chain as a table, newest first.
pub fn format_log_text(rows: &[LogEntryRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Snapshot Log")));
    if rows.is_empty() {
        out.push_str("No snapshots yet.\n");
        return out;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Snapshot", "Manifest", "Parent", "Taken"]);
    for row in rows {
        let parent = if row.parent == "root" {
            row.parent.clone()
        } else {
            short(&row.parent)
        };
        table.add_row(vec![
            short(&row.snapshot),
            short(&row.manifest),
            parent,
            row.taken.clone(),
        ]);
    }
    out.push_str(&format!("{}\n", table));
    out
}

/// Render a verification report.
pub fn format_verify_text(report: &VerifyReport) -> String {
    if report.verified {
        return format!(
            "Manifest verified: all {} referenced objects present.\n",
            report.checked
        );
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format_section_heading("Missing objects")
    ));
    for hash in &report.missing {
        out.push_str(&format!("  {}\n", hash));
    }
    out.push_str(&format!(
        "\n{} of {} referenced objects missing.\n",
        report.missing.len(),
        report.checked
    ));
    out
}
