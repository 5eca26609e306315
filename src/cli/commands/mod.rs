//! Command implementations.
//!
//! Every command resolves [`Settings`] from the layered config and reads the
//! issue store fresh; nothing is cached between invocations.

pub mod backlog;
pub mod check;
pub mod classify;
pub mod completions;
pub mod config;
pub mod deps;
pub mod list;
pub mod sync;
pub mod tasklist;

use crate::classify::Classifier;
use crate::config::{CliOverrides, Settings, load_settings};
use crate::error::Result;
use crate::storage::{IssueStore, read_issues};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Settings, classifier, and issues for one command.
pub struct CommandContext {
    pub settings: Settings,
    pub classifier: Classifier,
    pub store: IssueStore,
}

impl CommandContext {
    /// Resolve config and read the issue store.
    ///
    /// # Errors
    ///
    /// Returns an error if config is invalid or the store exists but cannot be
    /// read.
    pub fn load(overrides: &CliOverrides) -> Result<Self> {
        let settings = load_settings(overrides)?;
        debug!(
            root = %settings.root.display(),
            issues = %settings.issues_path.display(),
            build_root = %settings.build_root.display(),
            "Resolved settings"
        );
        let store = read_issues(&settings.issues_path)?;
        let classifier = settings.classifier();
        Ok(Self {
            settings,
            classifier,
            store,
        })
    }
}

/// Print `content` to stdout, or write it to `output` when given.
pub(crate) fn emit_document(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            eprintln!("Wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
