//! JSONL issue store reader.
//!
//! Each line is parsed on its own. Blank lines are skipped silently; lines
//! that fail to parse or fail the `Issue` shape are recorded as
//! [`LineDiagnostic`]s and skipped, so one bad line never aborts a read.

use crate::error::{Result, SyncError};
use crate::model::{Issue, IssueType};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// A line of the store that could not be turned into an `Issue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDiagnostic {
    /// 1-based line number.
    pub line: usize,
    pub reason: String,
}

impl std::fmt::Display for LineDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Parsed issues (in file order) plus the diagnostics for skipped lines.
#[derive(Debug, Clone, Default)]
pub struct IssueStore {
    pub issues: Vec<Issue>,
    pub diagnostics: Vec<LineDiagnostic>,
}

impl IssueStore {
    #[must_use]
    pub fn from_issues(issues: Vec<Issue>) -> Self {
        Self {
            issues,
            diagnostics: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.id == id)
    }

    /// Issues whose status is anything other than `closed`.
    #[must_use]
    pub fn open_issues(&self) -> Vec<&Issue> {
        self.issues
            .iter()
            .filter(|issue| !issue.status.is_closed())
            .collect()
    }

    #[must_use]
    pub fn issues_of_type(&self, issue_type: &IssueType) -> Vec<&Issue> {
        self.issues
            .iter()
            .filter(|issue| &issue.issue_type == issue_type)
            .collect()
    }

    #[must_use]
    pub fn all(&self) -> Vec<&Issue> {
        self.issues.iter().collect()
    }
}

/// Read all issues from a JSONL file.
///
/// A missing file is an empty store, not an error.
///
/// # Errors
///
/// Returns an error only if the file exists but cannot be read.
pub fn read_issues(path: &Path) -> Result<IssueStore> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Issue store not found; treating as empty");
            return Ok(IssueStore::default());
        }
        Err(e) => return Err(SyncError::Io(e)),
    };

    let store = parse_issues(&bytes);
    debug!(
        path = %path.display(),
        issues = store.issues.len(),
        skipped = store.diagnostics.len(),
        "Read issue store"
    );
    Ok(store)
}

/// Parse JSONL content already in memory.
#[must_use]
pub fn parse_issues(bytes: &[u8]) -> IssueStore {
    let mut store = IssueStore::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (idx, raw) in bytes.split(|b| *b == b'\n').enumerate() {
        let line_num = idx + 1;
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);

        let line = match std::str::from_utf8(raw) {
            Ok(line) => line,
            Err(e) => {
                push_diagnostic(&mut store, line_num, format!("invalid UTF-8: {e}"));
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match parse_issue_line(line) {
            Ok(issue) => {
                if seen.insert(issue.id.clone()) {
                    store.issues.push(issue);
                } else {
                    push_diagnostic(
                        &mut store,
                        line_num,
                        format!("duplicate id '{}' (first occurrence kept)", issue.id),
                    );
                }
            }
            Err(reason) => push_diagnostic(&mut store, line_num, reason),
        }
    }

    store
}

/// Parse and shape-check a single non-blank line.
///
/// # Errors
///
/// Returns the reason the line is not a usable issue.
pub fn parse_issue_line(line: &str) -> std::result::Result<Issue, String> {
    let issue: Issue = serde_json::from_str(line.trim()).map_err(|e| e.to_string())?;

    if issue.id.trim().is_empty() {
        return Err("issue id is empty".to_string());
    }
    if issue.title.trim().is_empty() {
        return Err(format!("issue '{}' has an empty title", issue.id));
    }

    Ok(issue)
}

fn push_diagnostic(store: &mut IssueStore, line: usize, reason: String) {
    warn!(line, %reason, "Skipping issue store line");
    store.diagnostics.push(LineDiagnostic { line, reason });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use tempfile::TempDir;

    const T1: &str = r#"{"id":"t1","title":"Design","status":"closed","priority":1,"issue_type":"task"}"#;
    const T2: &str = r#"{"id":"t2","title":"Implement v0.5.0 sync","status":"in_progress","priority":2,"issue_type":"feature","dependencies":[{"depends_on_id":"t1","type":"blocks"}]}"#;

    #[test]
    fn test_missing_file_returns_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = read_issues(&temp_dir.path().join("nope.jsonl")).unwrap();
        assert!(store.is_empty());
        assert!(store.diagnostics.is_empty());
    }

    #[test]
    fn test_reads_in_file_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("issues.jsonl");
        fs::write(&path, format!("{T2}\n{T1}\n")).unwrap();

        let store = read_issues(&path).unwrap();
        let ids: Vec<&str> = store.issues.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t1"]);
        assert_eq!(store.issues[0].dependency_ids(), vec!["t1"]);
    }

    #[test]
    fn test_malformed_line_is_skipped_with_diagnostic() {
        let content = format!("{T1}\n{{not json\n");
        let store = parse_issues(content.as_bytes());
        assert_eq!(store.len(), 1);
        assert_eq!(store.diagnostics.len(), 1);
        assert_eq!(store.diagnostics[0].line, 2);
    }

    #[test]
    fn test_blank_lines_skipped_silently() {
        let content = format!("\n   \n{T1}\r\n\n{T2}");
        let store = parse_issues(content.as_bytes());
        assert_eq!(store.len(), 2);
        assert!(store.diagnostics.is_empty());
    }

    #[test]
    fn test_shape_failures() {
        let content = concat!(
            r#"{"title":"no id"}"#,
            "\n",
            r#"{"id":"","title":"blank id"}"#,
            "\n",
            r#"{"id":"x","title":"   "}"#,
            "\n",
            r#"{"id":"y","title":"bad priority","priority":"high"}"#,
            "\n",
            r#"[1,2,3]"#,
        );
        let store = parse_issues(content.as_bytes());
        assert!(store.is_empty());
        let lines: Vec<usize> = store.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_invalid_utf8_line_does_not_abort() {
        let mut content = T1.as_bytes().to_vec();
        content.push(b'\n');
        content.extend_from_slice(&[0xff, 0xfe, b'{', b'}']);
        content.push(b'\n');
        content.extend_from_slice(T2.as_bytes());

        let store = parse_issues(&content);
        assert_eq!(store.len(), 2);
        assert_eq!(store.diagnostics.len(), 1);
        assert!(store.diagnostics[0].reason.contains("UTF-8"));
    }

    #[test]
    fn test_duplicate_id_keeps_first() {
        let dup = r#"{"id":"t1","title":"Second copy"}"#;
        let content = format!("{T1}\n{dup}\n");
        let store = parse_issues(content.as_bytes());
        assert_eq!(store.len(), 1);
        assert_eq!(store.issues[0].title, "Design");
        assert!(store.diagnostics[0].reason.contains("duplicate"));
    }

    #[test]
    fn test_views() {
        let content = format!("{T1}\n{T2}\n");
        let store = parse_issues(content.as_bytes());

        let open: Vec<&str> = store.open_issues().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(open, vec!["t2"]);

        let features = store.issues_of_type(&IssueType::Feature);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].status, Status::InProgress);

        assert!(store.get("t1").is_some());
        assert!(store.get("t3").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_path_is_error() {
        let temp_dir = TempDir::new().unwrap();
        // A directory cannot be read as a file.
        let result = read_issues(temp_dir.path());
        assert!(matches!(result, Err(SyncError::Io(_))));
    }
}
