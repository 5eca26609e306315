//! Single-pass Beads -> Cody synchronization.
//!
//! One run:
//! - reads the issue store (a missing or unreadable store counts as empty)
//! - overwrites `<build-root>/feature-backlog.md` with every issue
//! - overwrites `<build-root>/<version>/tasklist.md` for each version whose
//!   directory already exists
//!
//! Artifacts are written independently. A failed write is recorded in the
//! [`SyncReport`] and the remaining artifacts are still attempted.

use crate::classify::Classifier;
use crate::error::{Result, SyncError};
use crate::format::backlog::render_backlog_with_label;
use crate::format::render_tasklist;
use crate::graph::{DanglingReference, DependencyGraph};
use crate::model::Issue;
use crate::storage::{IssueStore, LineDiagnostic, read_issues};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Paths and switches for one sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub issues_path: PathBuf,
    /// Directory holding the backlog and the per-version directories.
    pub build_root: PathBuf,
    pub backlog_file: String,
    pub tasklist_file: String,
    /// Count closed issues in tasklists (default: open issues only).
    pub include_closed_in_tasklists: bool,
    /// Render everything, write nothing.
    pub dry_run: bool,
}

impl SyncConfig {
    #[must_use]
    pub fn backlog_path(&self) -> PathBuf {
        self.build_root.join(&self.backlog_file)
    }

    #[must_use]
    pub fn tasklist_path(&self, version: &str) -> PathBuf {
        self.build_root.join(version).join(&self.tasklist_file)
    }
}

/// What happened to one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    /// New or changed content was written.
    Written,
    /// Content matched the file on disk (it is still rewritten).
    Unchanged,
    /// Dry run: the file would have been written.
    WouldWrite,
    Failed,
}

impl ArtifactStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::Unchanged => "unchanged",
            Self::WouldWrite => "would_write",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactOutcome {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub status: ArtifactStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of one sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub issue_count: usize,
    /// Set when the store existed but could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_error: Option<String>,
    pub diagnostics: Vec<LineDiagnostic>,
    pub backlog: ArtifactOutcome,
    pub tasklists: Vec<ArtifactOutcome>,
    /// Versions with work but no directory under the build root.
    pub skipped_versions: Vec<String>,
    /// Issues that fell through to the Backlog section.
    pub unversioned: Vec<String>,
    pub cycles: Vec<Vec<String>>,
    pub dangling: Vec<DanglingReference>,
}

impl SyncReport {
    #[must_use]
    pub fn artifacts(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        std::iter::once(&self.backlog).chain(self.tasklists.iter())
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.artifacts()
            .filter(|a| a.status == ArtifactStatus::Failed)
            .count()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    /// Convert a report with failed artifacts into [`SyncError::SyncFailed`].
    ///
    /// # Errors
    ///
    /// Returns `SyncFailed` when at least one artifact failed to write.
    pub fn into_result(self) -> Result<Self> {
        let failed = self.failed_count();
        if failed > 0 {
            return Err(SyncError::SyncFailed { failed });
        }
        Ok(self)
    }
}

/// Run one synchronization pass.
#[must_use]
pub fn run_sync(config: &SyncConfig, classifier: &Classifier) -> SyncReport {
    let (store, store_error) = match read_issues(&config.issues_path) {
        Ok(store) => (store, None),
        Err(e) => {
            warn!(
                path = %config.issues_path.display(),
                error = %e,
                "Issue store unreadable; continuing with no issues"
            );
            (IssueStore::default(), Some(e.to_string()))
        }
    };

    info!(
        path = %config.issues_path.display(),
        issues = store.len(),
        skipped_lines = store.diagnostics.len(),
        "Loaded issue store"
    );

    sync_store(config, classifier, &store, store_error)
}

/// Synchronize an already-loaded store.
#[must_use]
pub fn sync_store(
    config: &SyncConfig,
    classifier: &Classifier,
    store: &IssueStore,
    store_error: Option<String>,
) -> SyncReport {
    let graph = DependencyGraph::build(&store.issues);
    let cycles = graph.detect_all_cycles();
    for cycle in &cycles {
        warn!(cycle = %cycle.join(" -> "), "Dependency cycle detected");
    }
    let dangling = graph.dangling_references();
    for reference in &dangling {
        warn!(
            issue = %reference.issue_id,
            depends_on = %reference.depends_on_id,
            "Dependency references an unknown issue"
        );
    }

    let all_groups = classifier.group_by_version(&store.issues);
    let unversioned: Vec<String> = all_groups.backlog.iter().map(|i| i.id.clone()).collect();
    if !unversioned.is_empty() {
        info!(
            count = unversioned.len(),
            ids = %unversioned.join(", "),
            "Issues without a version go to {}",
            classifier.backlog_label()
        );
    }

    let backlog_doc = render_backlog_with_label(
        &all_groups,
        classifier.version_order(),
        classifier.backlog_label(),
    );
    let backlog = write_artifact(&config.backlog_path(), None, &backlog_doc, config.dry_run, true);

    let selected = tasklist_issues(store, config.include_closed_in_tasklists);
    let groups = classifier.group_by_version(selected);

    let mut tasklists = Vec::new();
    let mut skipped_versions = Vec::new();
    for (version, issues) in groups.ordered(classifier.version_order()) {
        if !is_plain_dir_name(version) {
            warn!(version, "Version label is not a plain directory name; skipping");
            skipped_versions.push(version.to_string());
            continue;
        }

        let version_dir = config.build_root.join(version);
        if !version_dir.is_dir() {
            debug!(
                version,
                dir = %version_dir.display(),
                "No version directory; skipping tasklist"
            );
            skipped_versions.push(version.to_string());
            continue;
        }

        let doc = render_tasklist(version, issues, classifier);
        tasklists.push(write_artifact(
            &config.tasklist_path(version),
            Some(version),
            &doc,
            config.dry_run,
            false,
        ));
    }

    SyncReport {
        issue_count: store.len(),
        store_error,
        diagnostics: store.diagnostics.clone(),
        backlog,
        tasklists,
        skipped_versions,
        unversioned,
        cycles,
        dangling,
    }
}

/// Issues that feed per-version tasklists.
#[must_use]
pub fn tasklist_issues(store: &IssueStore, include_closed: bool) -> Vec<&Issue> {
    if include_closed {
        store.all()
    } else {
        store.open_issues()
    }
}

/// Render one version's tasklist from a loaded store.
///
/// # Errors
///
/// Returns `UnknownVersion` if no issue in the store resolves to `version`.
pub fn render_version_tasklist(
    store: &IssueStore,
    classifier: &Classifier,
    version: &str,
    include_closed: bool,
) -> Result<String> {
    let known = classifier
        .group_by_version(&store.issues)
        .versions
        .contains_key(version);
    if !known {
        return Err(SyncError::UnknownVersion {
            version: version.to_string(),
        });
    }

    let groups = classifier.group_by_version(tasklist_issues(store, include_closed));
    let issues = groups.versions.get(version).map_or(&[][..], Vec::as_slice);
    Ok(render_tasklist(version, issues, classifier))
}

/// Hex SHA-256 of `bytes`.
#[must_use]
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn write_artifact(
    path: &Path,
    version: Option<&str>,
    content: &str,
    dry_run: bool,
    create_parent: bool,
) -> ArtifactOutcome {
    let outcome = |status, error| ArtifactOutcome {
        path: path.to_path_buf(),
        version: version.map(ToString::to_string),
        status,
        error,
    };

    if dry_run {
        debug!(path = %path.display(), bytes = content.len(), "Dry run; not writing");
        return outcome(ArtifactStatus::WouldWrite, None);
    }

    let unchanged = fs::read(path)
        .is_ok_and(|existing| content_digest(&existing) == content_digest(content.as_bytes()));

    match write_file(path, content.as_bytes(), create_parent) {
        Ok(()) => {
            let status = if unchanged {
                ArtifactStatus::Unchanged
            } else {
                ArtifactStatus::Written
            };
            info!(path = %path.display(), status = status.as_str(), "Artifact synced");
            outcome(status, None)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Artifact write failed");
            outcome(ArtifactStatus::Failed, Some(e.to_string()))
        }
    }
}

/// Whole-file overwrite through a sibling temp file and rename.
fn write_file(path: &Path, bytes: &[u8], create_parent: bool) -> Result<()> {
    let wrap = |source| SyncError::ArtifactWrite {
        path: path.to_path_buf(),
        source,
    };

    let parent = path.parent().ok_or_else(|| {
        SyncError::Config(format!("Invalid artifact path: {}", path.display()))
    })?;
    if create_parent {
        fs::create_dir_all(parent).map_err(wrap)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp_path = parent.join(format!(".{file_name}.tmp"));

    let result = (|| {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(wrap(e));
    }
    Ok(())
}

fn is_plain_dir_name(version: &str) -> bool {
    let mut components = Path::new(version).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
