//! Error types and handling for `cody_sync`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration for glue code
//! - Provides recovery hints for user-facing errors
//! - Provides structured JSON output for AI coding agents
//!
//! Recoverable data-quality problems (malformed store lines, dangling
//! references, dependency cycles) are *not* errors: they are reported as
//! values by the reader and graph modules. Only hard failures land here.

mod structured;

pub use structured::{ErrorCode, StructuredError};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `cody_sync` operations.
#[derive(Error, Debug)]
pub enum SyncError {
    // === Issue Errors ===
    /// Issue with the specified ID was not found in the store.
    #[error("Issue not found: {id}")]
    IssueNotFound { id: String },

    /// Version label has no entries in the store.
    #[error("No issues assigned to version '{version}'")]
    UnknownVersion { version: String },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Unsupported version ordering mode.
    #[error("Invalid version order: {value}")]
    InvalidVersionOrder { value: String },

    // === Sync Errors ===
    /// Writing a rendered artifact failed.
    #[error("Failed to write {}: {source}", .path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One or more artifacts failed during a sync run.
    #[error("Sync finished with {failed} failed artifact(s)")]
    SyncFailed { failed: usize },

    /// `check --strict` found data-quality problems.
    #[error("Issue store has {count} data-quality problem(s)")]
    DataQuality { count: usize },

    // === Configuration Errors ===
    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SyncError {
    /// Can the user fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::IssueNotFound { .. }
                | Self::UnknownVersion { .. }
                | Self::Validation { .. }
                | Self::InvalidVersionOrder { .. }
                | Self::Config(_)
                | Self::DataQuality { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::IssueNotFound { .. } => Some("Run 'cody-sync list' to see available issues"),
            Self::UnknownVersion { .. } => {
                Some("Run 'cody-sync list' to see which versions issues resolve to")
            }
            Self::InvalidVersionOrder { .. } => Some("Valid version orders: lexical, semver"),
            Self::ArtifactWrite { .. } => Some("Check that the build directory is writable"),
            Self::SyncFailed { .. } => Some("Re-run with -v to see which artifact failed"),
            Self::DataQuality { .. } => Some("Run 'cody-sync check' for details"),
            Self::Config(_) | Self::Yaml(_) => {
                Some("Check .beads/cody-sync.yaml and ~/.config/cody-sync/config.yaml")
            }
            _ => None,
        }
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type using `SyncError`.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::IssueNotFound {
            id: "owk-56u".to_string(),
        };
        assert_eq!(err.to_string(), "Issue not found: owk-56u");
    }

    #[test]
    fn test_validation_error() {
        let err = SyncError::validation("version", "cannot be empty");
        assert_eq!(err.to_string(), "Validation failed: version: cannot be empty");
    }

    #[test]
    fn test_user_recoverable() {
        assert!(SyncError::Config("bad".to_string()).is_user_recoverable());
        let io = SyncError::Io(std::io::Error::other("disk"));
        assert!(!io.is_user_recoverable());
    }

    #[test]
    fn test_artifact_write_display() {
        let err = SyncError::ArtifactWrite {
            path: PathBuf::from("build/v0.5.0/tasklist.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to write build/v0.5.0/tasklist.md: denied"
        );
        assert!(err.suggestion().is_some());
    }
}
