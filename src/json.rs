use serde::{Deserialize, Serialize};

use crate::edit::EditError;
use crate::editor::EditResult;

/// A single anchored edit, as received from a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    /// Caller's identifier for this request; `"auto"` generates one
    #[serde(default = "default_execution_id")]
    pub execution_id: String,
    /// File to edit; may be left empty when supplied separately (e.g. `--file`)
    #[serde(default)]
    pub file_path: String,
    pub find_block: String,
    pub replace_block: String,
    /// Byte-exact matching when true, whitespace-tolerant when false.
    /// Absent means the editor's configured default.
    #[serde(default)]
    pub strict: Option<bool>,
    #[serde(default)]
    pub dry_run: bool,
}

fn default_execution_id() -> String {
    "auto".to_string()
}

/// Machine-readable outcome of an [`EditRequest`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditResponse {
    pub execution_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Stable error category: `file_not_found`, `anchor_not_found`,
    /// `ambiguous`, `no_op`, `validation_failed`, `revert_failed`,
    /// `stale_undo`, `io` or `request`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EditResponse {
    pub fn success(execution_id: String, result: &EditResult) -> Self {
        Self {
            execution_id,
            success: true,
            result: serde_json::to_value(result).ok(),
            error_kind: None,
            match_count: None,
            error: None,
        }
    }

    pub fn from_error(execution_id: String, error: &EditError) -> Self {
        Self {
            execution_id,
            success: false,
            result: None,
            error_kind: Some(error_kind(error).to_string()),
            match_count: error.match_count(),
            error: Some(error.to_string()),
        }
    }

    /// Failure that happened before the engine was reached (bad input, config)
    pub fn failure(execution_id: String, error: String) -> Self {
        Self {
            execution_id,
            success: false,
            result: None,
            error_kind: Some("request".to_string()),
            match_count: None,
            error: Some(error),
        }
    }
}

fn error_kind(error: &EditError) -> &'static str {
    match error {
        EditError::FileNotFound(_) => "file_not_found",
        EditError::AnchorNotFound { .. } => "anchor_not_found",
        EditError::Ambiguous { .. } => "ambiguous",
        EditError::NoOp { .. } => "no_op",
        EditError::ValidationFailed { .. } => "validation_failed",
        EditError::RevertFailed { .. } => "revert_failed",
        EditError::StaleUndo { .. } => "stale_undo",
        EditError::File(crate::file::FileError::NotFound(_)) => "file_not_found",
        EditError::File(_) => "io",
    }
}

/// Generate a unique execution ID using UUID v4
pub fn generate_execution_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Resolve `"auto"` to a fresh ID, keeping caller-supplied IDs
pub fn resolve_execution_id(requested: &str) -> String {
    if requested == "auto" || requested.is_empty() {
        generate_execution_id()
    } else {
        requested.to_string()
    }
}
