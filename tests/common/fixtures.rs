#![allow(dead_code)]

use serde_json::{Value, json};

/// One JSONL line in the issue tracker's export shape.
pub fn issue_line(id: &str, title: &str, status: &str, priority: i32, deps: &[&str]) -> String {
    let dependencies: Vec<Value> = deps
        .iter()
        .map(|dep| {
            json!({
                "issue_id": id,
                "depends_on_id": dep,
                "type": "blocks",
                "created_at": "2025-01-01T00:00:00Z",
                "created_by": "tester",
            })
        })
        .collect();

    json!({
        "id": id,
        "title": title,
        "description": "",
        "status": status,
        "priority": priority,
        "issue_type": "task",
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-02T00:00:00Z",
        "dependencies": dependencies,
    })
    .to_string()
}

pub fn jsonl(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// The three-issue scenario: t1 (override) and t2 (pattern) land in v0.5.0,
/// t3 falls through to Backlog.
pub fn scenario_jsonl() -> String {
    jsonl(&[
        issue_line("t1", "Design", "closed", 1, &[]),
        issue_line("t2", "Implement v0.5.0 sync", "in_progress", 2, &["t1"]),
        issue_line("t3", "Test", "closed", 3, &[]),
    ])
}

pub const SCENARIO_CONFIG: &str = "version-overrides:\n  t1: v0.5.0\n";

/// A store shaped like a real export: extra fields, offsets, phases,
/// several versions, and a closed version.
pub fn realistic_jsonl() -> String {
    let lines = [
        json!({
            "id": "owk-1", "title": "Set up repo skeleton for v0.4.0",
            "description": "Phase 1 groundwork", "status": "closed", "priority": 1,
            "issue_type": "chore", "assignee": "sam", "labels": ["infra"],
            "created_at": "2025-01-01T09:00:00+02:00", "updated_at": "2025-01-02T09:00:00Z",
            "closed_at": "2025-01-03T09:00:00Z", "dependencies": []
        }),
        json!({
            "id": "owk-2", "title": "Parser for version 0.5.0",
            "description": "phase 2: tokenize | parse", "notes": "", "status": "open",
            "priority": 0, "issue_type": "feature",
            "created_at": "2025-01-04T00:00:00Z", "updated_at": "2025-01-04T00:00:00Z",
            "dependencies": [{"issue_id": "owk-2", "depends_on_id": "owk-3", "type": "blocks"}]
        }),
        json!({
            "id": "owk-3", "title": "Lexer v0.5.0", "status": "in_progress",
            "priority": 0, "issue_type": "feature",
            "created_at": "2025-01-04T00:00:00Z", "updated_at": "2025-01-05T00:00:00Z"
        }),
        json!({
            "id": "owk-4", "title": "Docs polish", "notes": "Phase 3 wrap-up for v0.5.0",
            "status": "open", "priority": 3, "issue_type": "task",
            "created_at": "2025-01-06T00:00:00Z", "updated_at": "2025-01-06T00:00:00Z",
            "dependencies": null
        }),
        json!({
            "id": "owk-5", "title": "Investigate flaky CI", "status": "open",
            "priority": 2, "issue_type": "bug",
            "created_at": "2025-01-07T00:00:00Z", "updated_at": "2025-01-07T00:00:00Z",
            "dependencies": [{"depends_on_id": "owk-404", "type": "related"}]
        }),
    ];
    let lines: Vec<String> = lines.iter().map(Value::to_string).collect();
    jsonl(&lines)
}
