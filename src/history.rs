use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::path::Path;
use tracing::{debug, warn};

use crate::file::{FileError, write_file};

/// Default number of committed edits kept for undo
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Record of a committed, structurally valid edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditHistoryEntry {
    pub file_path: String,
    /// Full file content before the edit
    pub original_content: String,
    /// Full file content written by the edit
    pub new_content: String,
    pub find_block: String,
    pub replace_block: String,
    pub timestamp: DateTime<Utc>,
}

/// Bounded stack of committed edits, oldest evicted first
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<EditHistoryEntry>,
    max_entries: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    /// Create an empty history holding at most `max_entries` (minimum 1)
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: VecDeque::with_capacity(max_entries.min(DEFAULT_MAX_HISTORY)),
            max_entries,
        }
    }

    /// Push a committed edit, evicting the oldest entries past the limit
    pub fn commit(&mut self, entry: EditHistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.max_entries {
            if let Some(evicted) = self.entries.pop_front() {
                debug!(path = %evicted.file_path, "evicted oldest history entry");
            }
        }
    }

    /// Remove and return the most recent entry
    pub fn pop(&mut self) -> Option<EditHistoryEntry> {
        self.entries.pop_back()
    }

    /// Put an entry back on top, e.g. after a refused undo
    pub fn restore(&mut self, entry: EditHistoryEntry) {
        self.entries.push_back(entry);
    }

    /// Entries oldest first, optionally limited to one file
    pub fn entries(&self, file_path: Option<&str>) -> Vec<EditHistoryEntry> {
        self.entries
            .iter()
            .filter(|e| file_path.is_none_or(|p| e.file_path == p))
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

/// Rewrite `path` with its pre-edit bytes
///
/// Called synchronously on validation failure; the caller must not surface
/// the failure until this returns.
pub fn revert_now<P: AsRef<Path>>(path: P, original_content: &str) -> Result<(), FileError> {
    let path = path.as_ref();
    warn!(path = %path.display(), "reverting file to pre-edit content");
    write_file(path, original_content)
}
