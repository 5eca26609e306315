//! Sync command implementation.
//!
//! Regenerates `feature-backlog.md` and the tasklists of versions whose
//! directories already exist. Failed artifacts are reported after every
//! artifact has been attempted, then the command exits non-zero.

use crate::cli::SyncArgs;
use crate::config::{CliOverrides, load_settings};
use crate::error::Result;
use crate::sync::{ArtifactOutcome, ArtifactStatus, SyncReport, run_sync};
use std::path::Path;
use tracing::info;

/// Execute the sync command.
///
/// # Errors
///
/// Returns an error if config is invalid or any artifact failed to write.
pub fn execute(args: &SyncArgs, json: bool, quiet: bool, overrides: &CliOverrides) -> Result<()> {
    let settings = load_settings(overrides)?;
    let sync_config = settings.sync_config(args.dry_run);

    info!(
        issues = %sync_config.issues_path.display(),
        build_root = %sync_config.build_root.display(),
        dry_run = sync_config.dry_run,
        "Starting sync"
    );

    let report = run_sync(&sync_config, &settings.classifier());

    if json {
        super::print_json(&report)?;
    } else if !quiet {
        print!("{}", format_report(&report, &settings.root));
    }

    report.into_result().map(|_| ())
}

/// Human-readable summary of a sync run.
#[must_use]
pub fn format_report(report: &SyncReport, root: &Path) -> String {
    let mut out = String::new();

    out.push_str(&format!("Parsed {} issue(s)", report.issue_count));
    if !report.diagnostics.is_empty() {
        out.push_str(&format!(
            "; skipped {} malformed line(s)",
            report.diagnostics.len()
        ));
    }
    out.push('\n');
    if let Some(err) = &report.store_error {
        out.push_str(&format!("Issue store unreadable: {err}\n"));
    }

    out.push_str(&artifact_line("Backlog", &report.backlog, root));
    for tasklist in &report.tasklists {
        let label = format!("Tasklist {}", tasklist.version.as_deref().unwrap_or("?"));
        out.push_str(&artifact_line(&label, tasklist, root));
    }

    if !report.skipped_versions.is_empty() {
        out.push_str(&format!(
            "Skipped (no version directory): {}\n",
            report.skipped_versions.join(", ")
        ));
    }
    if !report.unversioned.is_empty() {
        out.push_str(&format!(
            "Unversioned issue(s) in backlog: {}\n",
            report.unversioned.len()
        ));
    }
    if !report.cycles.is_empty() || !report.dangling.is_empty() {
        out.push_str(&format!(
            "Warnings: {} dependency cycle(s), {} dangling reference(s) (see `cody-sync check`)\n",
            report.cycles.len(),
            report.dangling.len()
        ));
    }

    out
}

fn artifact_line(label: &str, artifact: &ArtifactOutcome, root: &Path) -> String {
    let path = artifact.path.strip_prefix(root).unwrap_or(&artifact.path);
    match artifact.status {
        ArtifactStatus::Failed => format!(
            "{label}: failed {} ({})\n",
            path.display(),
            artifact.error.as_deref().unwrap_or("unknown error")
        ),
        status => format!("{label}: {} {}\n", status.as_str(), path.display()),
    }
}
