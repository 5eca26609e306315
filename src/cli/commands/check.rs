//! Check command: data-quality report for the issue store.
//!
//! Parse diagnostics, dangling dependencies, and cycles are warnings during
//! sync. `check --strict` turns any of them into a failing exit code.

use super::{CommandContext, print_json};
use crate::cli::CheckArgs;
use crate::config::CliOverrides;
use crate::error::{Result, SyncError};
use crate::graph::{DanglingReference, DependencyGraph};
use crate::storage::{IssueStore, LineDiagnostic};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub issue_count: usize,
    pub diagnostics: Vec<LineDiagnostic>,
    pub dangling: Vec<DanglingReference>,
    pub cycles: Vec<Vec<String>>,
}

impl CheckReport {
    #[must_use]
    pub fn from_store(store: &IssueStore) -> Self {
        let graph = DependencyGraph::build(&store.issues);
        Self {
            issue_count: store.len(),
            diagnostics: store.diagnostics.clone(),
            dangling: graph.dangling_references(),
            cycles: graph.detect_all_cycles(),
        }
    }

    #[must_use]
    pub fn problem_count(&self) -> usize {
        self.diagnostics.len() + self.dangling.len() + self.cycles.len()
    }
}

/// Execute the check command.
///
/// # Errors
///
/// With `--strict`, returns `DataQuality` when any problem is found.
pub fn execute(args: &CheckArgs, json: bool, overrides: &CliOverrides) -> Result<()> {
    let ctx = CommandContext::load(overrides)?;
    let report = CheckReport::from_store(&ctx.store);

    if json {
        print_json(&report)?;
    } else {
        println!("{} issue(s) in {}", report.issue_count, ctx.settings.issues_path.display());
        for diagnostic in &report.diagnostics {
            println!("  malformed: {diagnostic}");
        }
        for reference in &report.dangling {
            println!(
                "  dangling:  {} depends on unknown {}",
                reference.issue_id, reference.depends_on_id
            );
        }
        for cycle in &report.cycles {
            println!("  cycle:     {}", cycle.join(" -> "));
        }
        if report.problem_count() == 0 {
            println!("No problems found.");
        } else {
            println!("{} problem(s) found.", report.problem_count());
        }
    }

    if args.strict && report.problem_count() > 0 {
        return Err(SyncError::DataQuality {
            count: report.problem_count(),
        });
    }
    Ok(())
}
