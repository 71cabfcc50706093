//! The public edit operation and its commit/revert contract.

use chrono::Utc;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::anchor::{MatchMode, find_unique};
use crate::config::EditorConfig;
use crate::edit::{EditError, apply_replacement, lines_changed, truncate_preview};
use crate::file::{checksum, read_file, write_file};
use crate::history::{EditHistoryEntry, History, revert_now};
use crate::json::EditRequest;
use crate::lint::{CommandLinter, Linter};
use crate::position::byte_to_position;
use crate::validate::validate;

/// Outcome of a successful (or dry-run) edit, or of an undo
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditResult {
    pub success: bool,
    pub file_path: String,
    /// Truncated text that was replaced
    pub old_preview: String,
    /// Truncated text that replaced it
    pub new_preview: String,
    pub lines_changed: usize,
    /// Byte shift (positive = content grew, negative = shrank)
    pub byte_shift: i64,
    /// Structural validity of the resulting content
    pub valid: bool,
    pub validation_message: Option<String>,
    /// Advisory findings; `None` when no linter ran or it passed
    pub lint_issues: Option<Vec<String>>,
    /// True when nothing was written
    pub dry_run: bool,
    /// Line (1-indexed) where the anchor matched
    pub line: Option<usize>,
    pub old_checksum: String,
    pub new_checksum: String,
    pub message: String,
}

/// Anchored search-and-replace editor
///
/// Each instance owns its own undo history; instances never share state.
/// Calls are synchronous and hold no locks, so callers editing the same path
/// from several places must serialize those calls themselves.
pub struct AnchoredEditor {
    config: EditorConfig,
    history: History,
    linter: Option<Box<dyn Linter>>,
}

impl Default for AnchoredEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl AnchoredEditor {
    /// Create an editor whose history size and linter come from `config`
    pub fn new(config: EditorConfig) -> Self {
        let history = History::new(config.max_history);
        Self::with_history(config, history)
    }

    /// Create an editor around an existing history
    pub fn with_history(config: EditorConfig, history: History) -> Self {
        let linter = config
            .lint
            .as_ref()
            .map(|lint| Box::new(CommandLinter::from_config(lint)) as Box<dyn Linter>);

        Self {
            config,
            history,
            linter,
        }
    }

    /// Replace the advisory linter (or remove it with `None`)
    pub fn set_linter(&mut self, linter: Option<Box<dyn Linter>>) {
        self.linter = linter;
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Replace the unique occurrence of `find_block` with `replace_block`
    ///
    /// Sequence: existence check, read, anchor count (exactly one or reject),
    /// build new content, then either return a preview (`dry_run`) or write,
    /// validate, and commit or revert. On any error the file holds the bytes
    /// it held before the call.
    pub fn search_and_replace<P: AsRef<Path>>(
        &mut self,
        file_path: P,
        find_block: &str,
        replace_block: &str,
        mode: MatchMode,
        dry_run: bool,
    ) -> Result<EditResult, EditError> {
        let path = file_path.as_ref();
        let display_path = path.display().to_string();

        if !path.is_file() {
            return Err(EditError::FileNotFound(display_path));
        }

        let file = read_file(path)?;
        let span = find_unique(&display_path, &file.content, find_block, mode)?;
        let replacement = apply_replacement(&display_path, &file.content, span, replace_block)?;
        let line = byte_to_position(&file.content, replacement.span.byte_start).line;

        if dry_run {
            let validation = validate(path, &replacement.new_content, &file.content);
            return Ok(EditResult {
                success: true,
                file_path: display_path,
                old_preview: self.preview(&replacement.old_block),
                new_preview: self.preview(replace_block),
                lines_changed: replacement.lines_changed,
                byte_shift: replacement.byte_shift,
                valid: validation.valid,
                validation_message: validation.message,
                lint_issues: None,
                dry_run: true,
                line: Some(line),
                old_checksum: file.checksum,
                new_checksum: replacement.new_checksum,
                message: format!("Dry run: would replace 1 occurrence at line {line}"),
            });
        }

        if let Err(e) = write_file(path, &replacement.new_content) {
            // A failed write may have truncated the file
            if let Err(revert_err) = revert_now(path, &file.content) {
                warn!(path = %display_path, error = %revert_err, "revert after failed write also failed");
            }
            return Err(e.into());
        }

        let validation = validate(path, &replacement.new_content, &file.content);
        if !validation.valid {
            let reason = validation
                .message
                .unwrap_or_else(|| "structural validation failed".to_string());

            if let Err(source) = revert_now(path, &file.content) {
                return Err(EditError::RevertFailed {
                    path: display_path,
                    reason,
                    source,
                });
            }
            return Err(EditError::ValidationFailed {
                path: display_path,
                reason,
            });
        }

        let old_checksum = file.checksum;
        self.history.commit(EditHistoryEntry {
            file_path: display_path.clone(),
            original_content: file.content,
            new_content: replacement.new_content,
            find_block: find_block.to_string(),
            replace_block: replace_block.to_string(),
            timestamp: Utc::now(),
        });
        info!(path = %display_path, line, lines_changed = replacement.lines_changed, "edit committed");

        let lint_issues = self.run_linter(path);

        Ok(EditResult {
            success: true,
            file_path: display_path,
            old_preview: self.preview(&replacement.old_block),
            new_preview: self.preview(replace_block),
            lines_changed: replacement.lines_changed,
            byte_shift: replacement.byte_shift,
            valid: true,
            validation_message: None,
            lint_issues,
            dry_run: false,
            line: Some(line),
            old_checksum,
            new_checksum: replacement.new_checksum,
            message: format!("Replaced 1 occurrence at line {line}"),
        })
    }

    /// Run `search_and_replace` from a request, using the configured default
    /// mode when the request does not pick one
    pub fn apply(&mut self, request: &EditRequest) -> Result<EditResult, EditError> {
        let strict = request.strict.unwrap_or(self.config.strict);
        self.search_and_replace(
            &request.file_path,
            &request.find_block,
            &request.replace_block,
            MatchMode::from_strict(strict),
            request.dry_run,
        )
    }

    /// Read-only check that `find_block` identifies exactly one location
    ///
    /// Uses the configured default matching mode.
    pub fn validate_anchor<P: AsRef<Path>>(&self, file_path: P, find_block: &str) -> (bool, String) {
        let mode = MatchMode::from_strict(self.config.strict);
        self.validate_anchor_with_mode(file_path, find_block, mode)
    }

    /// Run `validate_anchor` from a request, honoring its matching mode
    pub fn check(&self, request: &EditRequest) -> (bool, String) {
        let strict = request.strict.unwrap_or(self.config.strict);
        self.validate_anchor_with_mode(&request.file_path, &request.find_block, MatchMode::from_strict(strict))
    }

    /// Read-only anchor check with an explicit matching mode
    ///
    /// Runs the same gate `search_and_replace` runs, so a `true` here means
    /// the edit would reach the replacement step.
    pub fn validate_anchor_with_mode<P: AsRef<Path>>(
        &self,
        file_path: P,
        find_block: &str,
        mode: MatchMode,
    ) -> (bool, String) {
        let path = file_path.as_ref();
        let display = path.display().to_string();

        let file = match read_file(path) {
            Ok(file) => file,
            Err(e) => return (false, e.to_string()),
        };

        match find_unique(&display, &file.content, find_block, mode) {
            Ok(span) => {
                let line = byte_to_position(&file.content, span.byte_start).line;
                (true, format!("Anchor found exactly once at line {line}"))
            }
            Err(e) => (false, e.to_string()),
        }
    }

    /// Undo the most recent committed edit
    ///
    /// Returns `Ok(None)` when there is nothing to undo. If the file no
    /// longer holds the content the edit wrote, nothing is written, the entry
    /// stays in history, and `EditError::StaleUndo` is returned.
    pub fn undo_last(&mut self) -> Result<Option<EditResult>, EditError> {
        let Some(entry) = self.history.pop() else {
            return Ok(None);
        };

        let current = match read_file(&entry.file_path) {
            Ok(file) => file,
            Err(e) => {
                self.history.restore(entry);
                return Err(e.into());
            }
        };

        if current.content != entry.new_content {
            warn!(path = %entry.file_path, "refusing undo: file changed since edit");
            let path = entry.file_path.clone();
            self.history.restore(entry);
            return Err(EditError::StaleUndo { path });
        }

        if let Err(e) = write_file(&entry.file_path, &entry.original_content) {
            self.history.restore(entry);
            return Err(e.into());
        }
        info!(path = %entry.file_path, "edit undone");

        Ok(Some(EditResult {
            success: true,
            old_preview: self.preview(&entry.replace_block),
            new_preview: self.preview(&entry.find_block),
            lines_changed: lines_changed(&entry.replace_block, &entry.find_block),
            byte_shift: entry.original_content.len() as i64 - entry.new_content.len() as i64,
            valid: true,
            validation_message: None,
            lint_issues: None,
            dry_run: false,
            line: None,
            old_checksum: current.checksum,
            new_checksum: checksum(&entry.original_content),
            message: format!("Undid edit to {}", entry.file_path),
            file_path: entry.file_path,
        }))
    }

    /// Committed edits oldest first, optionally limited to one file
    pub fn get_history(&self, file_path: Option<&str>) -> Vec<EditHistoryEntry> {
        self.history.entries(file_path)
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn run_linter(&self, path: &Path) -> Option<Vec<String>> {
        let report = self.linter.as_ref()?.lint(path);
        if report.passed {
            None
        } else {
            Some(report.issues)
        }
    }

    fn preview(&self, text: &str) -> String {
        truncate_preview(text, self.config.preview_chars)
    }
}
