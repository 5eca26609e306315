//! Classify command: show which rule placed each issue.

use super::{CommandContext, print_json};
use crate::classify::{PhaseMatch, VersionMatch};
use crate::cli::ClassifyArgs;
use crate::config::CliOverrides;
use crate::error::{Result, SyncError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Classification {
    pub id: String,
    pub title: String,
    pub version: VersionMatch,
    pub phase: PhaseMatch,
}

/// Execute the classify command.
///
/// # Errors
///
/// Returns `IssueNotFound` for the first ID not in the store.
pub fn execute(args: &ClassifyArgs, json: bool, overrides: &CliOverrides) -> Result<()> {
    let ctx = CommandContext::load(overrides)?;

    let mut results = Vec::with_capacity(args.ids.len());
    for id in &args.ids {
        let issue = ctx
            .store
            .get(id)
            .ok_or_else(|| SyncError::IssueNotFound { id: id.clone() })?;
        results.push(Classification {
            id: issue.id.clone(),
            title: issue.title.clone(),
            version: ctx.classifier.classify_version(issue),
            phase: ctx.classifier.classify_phase(issue),
        });
    }

    if json {
        return print_json(&results);
    }

    for result in &results {
        let version = result
            .version
            .version
            .as_deref()
            .unwrap_or_else(|| ctx.classifier.backlog_label());
        println!("{}: {}", result.id, result.title);
        println!("  version: {version} ({})", result.version.source);
        println!("  phase:   {} ({})", result.phase.phase, result.phase.source);
    }
    Ok(())
}
