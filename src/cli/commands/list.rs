//! List command implementation.

use super::{CommandContext, print_json};
use crate::classify::Classifier;
use crate::cli::ListArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::status_glyph;
use crate::model::{Issue, IssueType};
use serde::Serialize;

/// One listed issue with its resolved placement.
#[derive(Debug, Serialize)]
pub struct ListedIssue<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub status: &'a str,
    pub priority: i32,
    pub issue_type: &'a str,
    pub version: String,
    pub phase: String,
}

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if config is invalid, the store cannot be read, or a
/// `--type` value is empty.
pub fn execute(args: &ListArgs, json: bool, overrides: &CliOverrides) -> Result<()> {
    let ctx = CommandContext::load(overrides)?;
    let types = args
        .type_
        .iter()
        .map(|t| t.parse())
        .collect::<Result<Vec<IssueType>>>()?;

    let issues = filter_issues(
        &ctx.store.issues,
        &ctx.classifier,
        args.open,
        &types,
        args.version.as_deref(),
    );

    let listed: Vec<ListedIssue<'_>> = issues
        .iter()
        .map(|issue| ListedIssue {
            id: &issue.id,
            title: &issue.title,
            status: issue.status.as_str(),
            priority: issue.priority.0,
            issue_type: issue.issue_type.as_str(),
            version: ctx.classifier.version_label(issue),
            phase: ctx.classifier.classify_phase(issue).phase,
        })
        .collect();

    if json {
        return print_json(&listed);
    }

    if listed.is_empty() {
        println!("No issues found.");
        return Ok(());
    }
    for (issue, row) in issues.iter().zip(&listed) {
        println!(
            "{} {} [{}] {} {} / {}: {}",
            status_glyph(&issue.status),
            row.id,
            issue.priority,
            row.issue_type,
            row.version,
            row.phase,
            row.title
        );
    }
    println!("\n{} issue(s)", listed.len());
    Ok(())
}

/// Apply list filters, keeping store order.
#[must_use]
pub fn filter_issues<'a>(
    issues: &'a [Issue],
    classifier: &Classifier,
    open_only: bool,
    types: &[IssueType],
    version: Option<&str>,
) -> Vec<&'a Issue> {
    issues
        .iter()
        .filter(|issue| !open_only || !issue.status.is_closed())
        .filter(|issue| types.is_empty() || types.contains(&issue.issue_type))
        .filter(|issue| version.is_none_or(|v| classifier.version_label(issue) == v))
        .collect()
}
