//! Markdown rendering for Cody build artifacts.
//!
//! Two documents are produced:
//! - `feature-backlog.md`: every issue, grouped by version (see [`backlog`])
//! - `<version>/tasklist.md`: one version's issues, grouped by phase (see [`tasklist`])
//!
//! Rendering is pure and deterministic: the same issues in the same order
//! always produce byte-identical output (LF line endings, no timestamps).

pub mod backlog;
pub mod tasklist;

pub use backlog::render_backlog;
pub use tasklist::{TasklistProgress, render_tasklist};

use crate::model::{Issue, Priority, Status};
use std::fmt::Write as _;

/// Status glyphs shared by both documents.
pub mod glyphs {
    pub const NOT_STARTED: &str = "🔴";
    pub const IN_PROGRESS: &str = "🟡";
    pub const COMPLETED: &str = "🟢";
}

/// Placeholder used when an issue has neither description nor notes.
pub const NO_DESCRIPTION: &str = "No description";

/// Dependencies cell for issues without dependencies.
pub const NO_DEPENDENCIES: &str = "None";

/// Fixed "Assigned To" value; assignment is not modelled.
pub const ASSIGNEE: &str = "AGENT";

pub(crate) const STATUS_LEGEND: &str = "## Status Legend\n\n\
- 🔴 Not Started\n\
- 🟡 In Progress\n\
- 🟢 Completed\n";

/// Glyph for a status; unknown statuses render as not started.
#[must_use]
pub fn status_glyph(status: &Status) -> &'static str {
    match status {
        Status::Closed => glyphs::COMPLETED,
        Status::InProgress => glyphs::IN_PROGRESS,
        Status::Open | Status::Custom(_) => glyphs::NOT_STARTED,
    }
}

#[must_use]
pub const fn priority_label(priority: Priority) -> &'static str {
    priority.label()
}

/// Make text safe for a single markdown table cell.
#[must_use]
pub fn escape_cell(text: &str) -> String {
    let single_line = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
    single_line.trim().replace('|', "\\|")
}

/// Description cell: description, else notes, else [`NO_DESCRIPTION`].
#[must_use]
pub fn description_cell(issue: &Issue) -> String {
    issue
        .summary_text()
        .map_or_else(|| NO_DESCRIPTION.to_string(), escape_cell)
}

/// Stable sort by ascending priority (most urgent first).
pub(crate) fn sort_by_priority(issues: &mut [&Issue]) {
    issues.sort_by_key(|issue| issue.priority);
}

/// Append a markdown table. Cells must already be escaped.
pub(crate) fn push_table(out: &mut String, headers: &[&str], rows: &[Vec<String>]) {
    let _ = writeln!(out, "| {} |", headers.join(" | "));
    let rule: Vec<String> = headers.iter().map(|h| "-".repeat(h.len() + 2)).collect();
    let _ = writeln!(out, "|{}|", rule.join("|"));
    for row in rows {
        let _ = writeln!(out, "| {} |", row.join(" | "));
    }
}
