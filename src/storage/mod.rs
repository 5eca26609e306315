//! Read-only access to the Beads issue store.
//!
//! The store is the tracker's JSONL export (`.beads/issues.jsonl`). It is
//! re-read on every invocation; nothing is cached between runs.

mod jsonl;

pub use jsonl::{IssueStore, LineDiagnostic, parse_issue_line, parse_issues, read_issues};
