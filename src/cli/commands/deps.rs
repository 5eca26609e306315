//! Deps command: per-issue dependency analysis or a store-wide cycle list.

use super::{CommandContext, print_json};
use crate::cli::DepsArgs;
use crate::config::CliOverrides;
use crate::error::{Result, SyncError};
use crate::graph::{DependencyAnalysis, DependencyGraph};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Serialize)]
struct DepsOutput<'a> {
    #[serde(flatten)]
    analysis: DependencyAnalysis,
    dependents: Vec<&'a str>,
    missing: Vec<&'a str>,
}

/// Execute the deps command.
///
/// # Errors
///
/// Returns `IssueNotFound` if the issue is not in the store.
pub fn execute(args: &DepsArgs, json: bool, overrides: &CliOverrides) -> Result<()> {
    let ctx = CommandContext::load(overrides)?;
    let graph = DependencyGraph::build(&ctx.store.issues);

    let Some(id) = args.id.as_deref().filter(|_| !args.cycles) else {
        let cycles = graph.detect_all_cycles();
        if json {
            return print_json(&json!({ "count": cycles.len(), "cycles": cycles }));
        }
        if cycles.is_empty() {
            println!("No dependency cycles found.");
        } else {
            for cycle in &cycles {
                println!("{}", cycle.join(" -> "));
            }
            println!("\n{} cycle(s)", cycles.len());
        }
        return Ok(());
    };

    let analysis = graph.analyze(id).ok_or_else(|| SyncError::IssueNotFound {
        id: id.to_string(),
    })?;
    let dependents = graph.dependents(id);
    let missing: Vec<&str> = graph
        .dependencies(id)
        .iter()
        .map(String::as_str)
        .filter(|dep| !graph.contains(dep))
        .collect();

    if json {
        return print_json(&DepsOutput {
            analysis,
            dependents,
            missing,
        });
    }

    println!("{}", analysis.issue_id);
    if analysis.dependencies.is_empty() {
        println!("  depends on: none");
    } else {
        println!("  depends on: {}", analysis.dependencies.join(", "));
    }
    if !missing.is_empty() {
        println!("  unknown:    {}", missing.join(", "));
    }
    if dependents.is_empty() {
        println!("  needed by:  none");
    } else {
        println!("  needed by:  {}", dependents.join(", "));
    }
    println!("  max depth:  {}", analysis.max_depth);
    if analysis.has_circular {
        println!("  circular:   yes ({})", analysis.cycle.join(" -> "));
    } else {
        println!("  circular:   no");
    }
    Ok(())
}
