//! Per-version tasklist document.
//!
//! Rows within a phase are ordered by ascending priority; equal priorities
//! keep dependency order (dependencies first), then input order. Issues on
//! a dependency cycle still render, in the order they were encountered.

use super::{
    ASSIGNEE, NO_DEPENDENCIES, STATUS_LEGEND, description_cell, escape_cell, push_table,
    status_glyph,
};
use crate::classify::Classifier;
use crate::graph::DependencyGraph;
use crate::model::Issue;
use serde::Serialize;
use std::fmt::Write as _;

const COLUMNS: &[&str] = &[
    "ID",
    "Task",
    "Description",
    "Dependencies",
    "Status",
    "Assigned To",
];

/// Closed/total counts for a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TasklistProgress {
    pub closed: usize,
    pub total: usize,
}

impl TasklistProgress {
    #[must_use]
    pub fn of(issues: &[&Issue]) -> Self {
        Self {
            closed: issues.iter().filter(|i| i.status.is_closed()).count(),
            total: issues.len(),
        }
    }

    /// Completion percentage rounded down; 0 when there are no tasks.
    #[must_use]
    pub const fn percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.closed * 100 / self.total
        }
    }
}

/// Render the tasklist for one version.
#[must_use]
pub fn render_tasklist(version: &str, issues: &[&Issue], classifier: &Classifier) -> String {
    let version = escape_cell(version);
    let progress = TasklistProgress::of(issues);

    let mut out = String::with_capacity(1024);
    let _ = writeln!(out, "# {version} Tasklist\n");
    let _ = writeln!(
        out,
        "This tasklist is synchronized from the Beads issue tracker by `cody-sync`; manual edits will be overwritten.\n"
    );
    let _ = writeln!(
        out,
        "**Progress:** {}/{} tasks completed ({}%)\n",
        progress.closed,
        progress.total,
        progress.percent()
    );
    out.push_str(STATUS_LEGEND);

    if issues.is_empty() {
        out.push_str("\nNo tasks are assigned to this version.\n");
        return out;
    }

    let topo = DependencyGraph::build(issues.iter().copied()).topological_order();
    let ranks = topo.ranks();
    let rank_of = |issue: &Issue| ranks.get(issue.id.as_str()).copied().unwrap_or(usize::MAX);

    for phase in classifier.group_by_phase(issues.iter().copied()) {
        let mut rows: Vec<&Issue> = phase.issues;
        rows.sort_by_key(|issue| (issue.priority, rank_of(*issue)));

        let table: Vec<Vec<String>> = rows
            .iter()
            .map(|issue| {
                vec![
                    escape_cell(&issue.id),
                    escape_cell(&issue.title),
                    description_cell(issue),
                    dependencies_cell(issue),
                    status_glyph(&issue.status).to_string(),
                    ASSIGNEE.to_string(),
                ]
            })
            .collect();

        let _ = writeln!(out, "\n## {}\n", escape_cell(&phase.label));
        push_table(&mut out, COLUMNS, &table);
    }

    out
}

fn dependencies_cell(issue: &Issue) -> String {
    let ids = issue.dependency_ids();
    if ids.is_empty() {
        NO_DEPENDENCIES.to_string()
    } else {
        escape_cell(&ids.join(", "))
    }
}
