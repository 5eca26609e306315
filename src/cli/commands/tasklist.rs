//! Tasklist command: render one version's tasklist without touching the
//! build directory.

use super::{CommandContext, emit_document, print_json};
use crate::cli::TasklistArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::TasklistProgress;
use crate::sync::{render_version_tasklist, tasklist_issues};
use serde_json::json;

/// Execute the tasklist command.
///
/// # Errors
///
/// Returns `UnknownVersion` if no issue resolves to the version, or an I/O
/// error if the output file cannot be written.
pub fn execute(args: &TasklistArgs, json: bool, overrides: &CliOverrides) -> Result<()> {
    let ctx = CommandContext::load(overrides)?;
    let include_closed = ctx.settings.include_closed_in_tasklists;
    let doc =
        render_version_tasklist(&ctx.store, &ctx.classifier, &args.version, include_closed)?;

    if json {
        let groups = ctx
            .classifier
            .group_by_version(tasklist_issues(&ctx.store, include_closed));
        let issues = groups
            .versions
            .get(&args.version)
            .map_or(&[][..], Vec::as_slice);
        let progress = TasklistProgress::of(issues);
        return print_json(&json!({
            "version": args.version,
            "progress": progress,
            "percent": progress.percent(),
            "ids": issues.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
            "markdown": doc,
        }));
    }

    emit_document(&doc, args.output.as_deref())
}
