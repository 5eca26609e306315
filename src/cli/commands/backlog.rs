//! Backlog command: render `feature-backlog.md` to stdout or a chosen file.

use super::{CommandContext, emit_document, print_json};
use crate::cli::RenderArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::backlog::render_backlog_with_label;
use serde_json::json;

/// Execute the backlog command.
///
/// # Errors
///
/// Returns an error if config is invalid, the store cannot be read, or the
/// output file cannot be written.
pub fn execute(args: &RenderArgs, json: bool, overrides: &CliOverrides) -> Result<()> {
    let ctx = CommandContext::load(overrides)?;
    let groups = ctx.classifier.group_by_version(&ctx.store.issues);
    let doc = render_backlog_with_label(
        &groups,
        ctx.classifier.version_order(),
        ctx.classifier.backlog_label(),
    );

    if json {
        let versions: Vec<&str> = groups
            .ordered(ctx.classifier.version_order())
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        return print_json(&json!({
            "issue_count": ctx.store.len(),
            "versions": versions,
            "unversioned": groups.backlog.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
            "markdown": doc,
        }));
    }

    emit_document(&doc, args.output.as_deref())
}
