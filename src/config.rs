use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::history::DEFAULT_MAX_HISTORY;

/// Default seconds an advisory linter may run before it is killed
pub const DEFAULT_LINT_TIMEOUT_SECS: u64 = 30;

/// Default characters kept in old/new block previews
pub const DEFAULT_PREVIEW_CHARS: usize = 200;

/// Editor settings, loadable from a JSON file
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Committed edits kept for undo
    pub max_history: usize,
    /// Characters kept in the old/new previews of an `EditResult`
    pub preview_chars: usize,
    /// Matching mode used when a request does not choose one
    pub strict: bool,
    /// Optional advisory linter run after each committed edit
    pub lint: Option<LintConfig>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            strict: true,
            lint: None,
        }
    }
}

/// External advisory linter invocation
///
/// `args` may contain `{file}`, replaced by the edited path; if no argument
/// does, the path is appended as the last argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_lint_timeout")]
    pub timeout_secs: u64,
}

fn default_lint_timeout() -> u64 {
    DEFAULT_LINT_TIMEOUT_SECS
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl EditorConfig {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;

        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }
}
