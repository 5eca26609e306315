//! Structured error output for AI coding agents.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Issue Errors (exit code 3) ===
    IssueNotFound,
    UnknownVersion,

    // === Validation Errors (exit code 4) ===
    ValidationFailed,
    InvalidVersionOrder,

    // === Sync Errors (exit code 6) ===
    ArtifactWriteFailed,
    SyncFailed,
    DataQuality,

    // === Config Errors (exit code 7) ===
    ConfigError,

    // === I/O Errors (exit code 8) ===
    IoError,
    JsonError,
    YamlError,

    // === Internal Errors (exit code 1) ===
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::IssueNotFound => "ISSUE_NOT_FOUND",
            Self::UnknownVersion => "UNKNOWN_VERSION",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::InvalidVersionOrder => "INVALID_VERSION_ORDER",
            Self::ArtifactWriteFailed => "ARTIFACT_WRITE_FAILED",
            Self::SyncFailed => "SYNC_FAILED",
            Self::DataQuality => "DATA_QUALITY",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether this error is potentially retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed
                | Self::InvalidVersionOrder
                | Self::ArtifactWriteFailed
                | Self::SyncFailed
        )
    }

    /// Get the exit code for this error category.
    ///
    /// - 1: Internal/unknown errors
    /// - 3: Issue errors
    /// - 4: Validation errors
    /// - 6: Sync errors
    /// - 7: Config errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::IssueNotFound | Self::UnknownVersion => 3,
            Self::ValidationFailed | Self::InvalidVersionOrder => 4,
            Self::ArtifactWriteFailed | Self::SyncFailed | Self::DataQuality => 6,
            // YAML is only read from config files.
            Self::ConfigError | Self::YamlError => 7,
            Self::IoError | Self::JsonError => 8,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `SyncError`.
    #[must_use]
    pub fn from_error(err: &SyncError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);

        Self {
            code,
            message: err.to_string(),
            hint: err.suggestion().map(str::to_string),
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Convert to the JSON envelope written to stderr.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &SyncError) -> (ErrorCode, Option<Value>) {
        match err {
            SyncError::IssueNotFound { id } => {
                (ErrorCode::IssueNotFound, Some(json!({"searched_id": id})))
            }
            SyncError::UnknownVersion { version } => {
                (ErrorCode::UnknownVersion, Some(json!({"version": version})))
            }
            SyncError::Validation { field, reason } => (
                ErrorCode::ValidationFailed,
                Some(json!({"field": field, "reason": reason})),
            ),
            SyncError::InvalidVersionOrder { value } => (
                ErrorCode::InvalidVersionOrder,
                Some(json!({"value": value, "valid": ["lexical", "semver"]})),
            ),
            SyncError::ArtifactWrite { path, .. } => (
                ErrorCode::ArtifactWriteFailed,
                Some(json!({"path": path.display().to_string()})),
            ),
            SyncError::SyncFailed { failed } => {
                (ErrorCode::SyncFailed, Some(json!({"failed": failed})))
            }
            SyncError::DataQuality { count } => {
                (ErrorCode::DataQuality, Some(json!({"count": count})))
            }
            SyncError::Config(_) => (ErrorCode::ConfigError, None),
            SyncError::Io(_) => (ErrorCode::IoError, None),
            SyncError::Json(_) => (ErrorCode::JsonError, None),
            SyncError::Yaml(_) => (ErrorCode::YamlError, None),
            SyncError::Other(_) => (ErrorCode::InternalError, None),
        }
    }
}
