//! Feature backlog document.
//!
//! Layout: fixed header and legend, then the Backlog section (issues with no
//! resolved version) if it has any rows, then one section per version,
//! newest first. Rows in every section are sorted by ascending priority.

use super::{
    STATUS_LEGEND, description_cell, escape_cell, glyphs, push_table, sort_by_priority,
    status_glyph,
};
use crate::classify::{VersionGroups, VersionOrder};
use crate::model::Issue;
use std::fmt::Write as _;

const HEADER: &str = "# Feature Backlog\n\n\
This document lists all features and enhancements derived from the Beads issue tracker.\n\
It is regenerated by `cody-sync`; manual edits will be overwritten.\n";

const COLUMNS: &[&str] = &["ID", "Feature", "Description", "Priority", "Status"];

/// Render the feature backlog for all issues.
#[must_use]
pub fn render_backlog(groups: &VersionGroups<'_>, order: VersionOrder) -> String {
    render_backlog_with_label(groups, order, crate::classify::BACKLOG_LABEL)
}

/// Render the feature backlog, naming the unversioned section `backlog_label`.
#[must_use]
pub fn render_backlog_with_label(
    groups: &VersionGroups<'_>,
    order: VersionOrder,
    backlog_label: &str,
) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(STATUS_LEGEND);

    if groups.total() == 0 {
        out.push_str("\nNo issues found in the issue store.\n");
        return out;
    }

    if !groups.backlog.is_empty() {
        let _ = writeln!(out, "\n## {}\n", escape_cell(backlog_label));
        push_section_table(&mut out, &groups.backlog);
    }

    for (version, issues) in groups.ordered(order) {
        let completed = issues.iter().all(|issue| issue.status.is_closed());
        let marker = if completed {
            format!("{} Completed", glyphs::COMPLETED)
        } else {
            format!("{} Not Started", glyphs::NOT_STARTED)
        };
        let _ = writeln!(out, "\n## {} - {marker}\n", escape_cell(version));
        push_section_table(&mut out, issues);
    }

    out
}

fn push_section_table(out: &mut String, issues: &[&Issue]) {
    let mut sorted: Vec<&Issue> = issues.to_vec();
    sort_by_priority(&mut sorted);

    let rows: Vec<Vec<String>> = sorted
        .iter()
        .map(|issue| {
            vec![
                escape_cell(&issue.id),
                escape_cell(&issue.title),
                description_cell(issue),
                issue.priority.label().to_string(),
                status_glyph(&issue.status).to_string(),
            ]
        })
        .collect();

    push_table(out, COLUMNS, &rows);
}
