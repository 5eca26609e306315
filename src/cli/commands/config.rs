//! Config command: show the merged configuration and where it came from.

use super::print_json;
use crate::config::{CliOverrides, PROJECT_CONFIG_PATH, Settings, load_settings};
use crate::error::Result;
use serde_json::json;
use std::env;
use std::path::PathBuf;

/// Execute the config command.
///
/// # Errors
///
/// Returns an error if any config layer is invalid.
pub fn execute(json: bool, overrides: &CliOverrides) -> Result<()> {
    let settings = load_settings(overrides)?;
    let project_file = settings.root.join(PROJECT_CONFIG_PATH);
    let user_file = user_config_path();

    if json {
        return print_json(&json!({
            "settings": settings,
            "files": {
                "user": user_file.as_ref().map(|p| p.display().to_string()),
                "user_exists": user_file.as_ref().is_some_and(|p| p.exists()),
                "project": project_file.display().to_string(),
                "project_exists": project_file.exists(),
            }
        }));
    }

    for (key, value) in settings_lines(&settings) {
        println!("{key} = {value}");
    }
    println!();
    if let Some(path) = &user_file {
        println!("# user config:    {}{}", path.display(), missing_marker(path.exists()));
    }
    println!(
        "# project config: {}{}",
        project_file.display(),
        missing_marker(project_file.exists())
    );
    Ok(())
}

/// Flattened `key = value` view, in a fixed order.
#[must_use]
pub fn settings_lines(settings: &Settings) -> Vec<(String, String)> {
    let mut lines = vec![
        ("root".to_string(), settings.root.display().to_string()),
        (
            "issues-path".to_string(),
            settings.issues_path.display().to_string(),
        ),
        (
            "build-root".to_string(),
            settings.build_root.display().to_string(),
        ),
        ("backlog-file".to_string(), settings.backlog_file.clone()),
        ("tasklist-file".to_string(), settings.tasklist_file.clone()),
        (
            "tasklist.include-closed".to_string(),
            settings.include_closed_in_tasklists.to_string(),
        ),
        ("backlog-label".to_string(), settings.backlog_label.clone()),
        ("default-phase".to_string(), settings.default_phase.clone()),
        (
            "version-order".to_string(),
            settings.version_order.to_string(),
        ),
    ];
    for (id, version) in &settings.version_overrides {
        lines.push((format!("version-overrides.{id}"), version.clone()));
    }
    for (id, phase) in &settings.phase_overrides {
        lines.push((format!("phase-overrides.{id}"), phase.clone()));
    }
    lines
}

fn user_config_path() -> Option<PathBuf> {
    let home = env::var("HOME").ok()?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("cody-sync")
            .join("config.yaml"),
    )
}

const fn missing_marker(exists: bool) -> &'static str {
    if exists { "" } else { " (not found)" }
}
