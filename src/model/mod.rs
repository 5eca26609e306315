//! Core data types for `cody_sync`.
//!
//! This module defines the records read from the Beads issue store:
//! - `Issue` - One line of `issues.jsonl`
//! - `Status` - Issue lifecycle states
//! - `IssueType` - Categories of issues
//! - `Priority` - 0 (most urgent) through 4
//! - `Dependency` - Relationships between issues

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Issue lifecycle status.
///
/// Unknown values exported by newer trackers are preserved as `Custom`
/// rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Closed,
    #[serde(untagged)]
    Custom(String),
}

impl Status {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
            Self::Custom(value) => value,
        }
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Status {
    type Err = crate::error::SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in_progress" | "inprogress" | "in-progress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            "" => Err(crate::error::SyncError::validation("status", "cannot be empty")),
            other => Ok(Self::Custom(other.to_string())),
        }
    }
}

/// Issue priority (0 = most urgent, 4 = backlog).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Priority(pub i32);

impl Priority {
    pub const CRITICAL: Self = Self(0);
    pub const HIGH: Self = Self(1);
    pub const MEDIUM: Self = Self(2);
    pub const LOW: Self = Self(3);
    pub const BACKLOG: Self = Self(4);

    /// Rendered label: `High` for 0-1, `Medium` for 2, `Low` for 3 and above.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self.0 {
            i32::MIN..=1 => "High",
            2 => "Medium",
            _ => "Low",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::MEDIUM
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Issue type category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    #[default]
    Task,
    Bug,
    Feature,
    Epic,
    Chore,
    #[serde(untagged)]
    Custom(String),
}

impl IssueType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Task => "task",
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Epic => "epic",
            Self::Chore => "chore",
            Self::Custom(value) => value,
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = crate::error::SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "task" => Ok(Self::Task),
            "bug" => Ok(Self::Bug),
            "feature" => Ok(Self::Feature),
            "epic" => Ok(Self::Epic),
            "chore" => Ok(Self::Chore),
            "" => Err(crate::error::SyncError::validation("type", "cannot be empty")),
            other => Ok(Self::Custom(other.to_string())),
        }
    }
}

/// Dependency relationship type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyType {
    #[default]
    Blocks,
    ParentChild,
    Related,
    DiscoveredFrom,
    #[serde(untagged)]
    Custom(String),
}

impl DependencyType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Blocks => "blocks",
            Self::ParentChild => "parent-child",
            Self::Related => "related",
            Self::DiscoveredFrom => "discovered-from",
            Self::Custom(value) => value,
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line of the issue store.
///
/// Only the fields the sync engine reads are modelled; everything else the
/// tracker exports is ignored on deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Issue {
    /// Unique ID (e.g., "owk-56u").
    pub id: String,

    /// Human-readable summary.
    pub title: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,

    #[serde(default)]
    pub status: Status,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub issue_type: IssueType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub dependencies: Vec<Dependency>,
}

impl Issue {
    /// Minimal open issue; mostly useful for tests and fixtures.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            notes: String::new(),
            status: Status::Open,
            priority: Priority::default(),
            issue_type: IssueType::default(),
            created_at: None,
            updated_at: None,
            closed_at: None,
            dependencies: Vec::new(),
        }
    }

    /// Text the classifier searches: title, description and notes joined by spaces.
    #[must_use]
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.notes)
    }

    /// Direct dependency IDs in declaration order.
    ///
    /// Duplicates and self-references are dropped.
    #[must_use]
    pub fn dependency_ids(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.dependencies.len());
        let mut ids: Vec<String> = Vec::with_capacity(self.dependencies.len());
        for dep in &self.dependencies {
            let target = dep.depends_on_id.trim();
            if target.is_empty() || target == self.id || !seen.insert(target) {
                continue;
            }
            ids.push(target.to_string());
        }
        ids
    }

    /// Description, falling back to notes when the description is blank.
    #[must_use]
    pub fn summary_text(&self) -> Option<&str> {
        [self.description.trim(), self.notes.trim()]
            .into_iter()
            .find(|text| !text.is_empty())
    }
}

/// Relationship between two issues.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dependency {
    /// The issue that has the dependency (source). Often omitted in exports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<String>,

    /// The issue that must complete first.
    pub depends_on_id: String,

    #[serde(rename = "type", default)]
    pub dep_type: DependencyType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Dependency {
    #[must_use]
    pub fn blocks(depends_on_id: impl Into<String>) -> Self {
        Self {
            issue_id: None,
            depends_on_id: depends_on_id.into(),
            dep_type: DependencyType::Blocks,
            created_at: None,
            created_by: None,
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
