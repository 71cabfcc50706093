use thiserror::Error;

use crate::file::{FileError, checksum};
use crate::position::Span;

/// Error types for anchored edit operations
///
/// Every variant except `ValidationFailed` and `RevertFailed` is raised
/// before anything is written, so the target file is untouched.
#[derive(Debug, Error)]
pub enum EditError {
    /// Target file does not exist
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The anchor matched zero times
    #[error("Anchor not found in {path}: '{anchor_preview}'")]
    AnchorNotFound {
        path: String,
        anchor_preview: String,
    },

    /// The anchor matched more than once
    #[error(
        "Anchor ambiguous in {path}, found {match_count} times: '{anchor_preview}'. \
         Include more surrounding context to make it unique"
    )]
    Ambiguous {
        path: String,
        match_count: usize,
        anchor_preview: String,
    },

    /// Replacing the anchor leaves the file unchanged
    #[error("Replacement produces no change in {path}; find and replace blocks are likely identical")]
    NoOp { path: String },

    /// The written content failed structural validation and was reverted
    #[error("Validation failed for {path}, edit reverted: {reason}")]
    ValidationFailed { path: String, reason: String },

    /// Validation failed and rewriting the original bytes failed as well
    #[error("Validation failed for {path} ({reason}) and revert failed: {source}")]
    RevertFailed {
        path: String,
        reason: String,
        #[source]
        source: FileError,
    },

    /// Undo refused because the file no longer holds the edited content
    #[error("Cannot undo edit to {path}: file changed since edit")]
    StaleUndo { path: String },

    /// Reading or writing the file failed
    #[error(transparent)]
    File(#[from] FileError),
}

impl EditError {
    /// Number of anchor matches behind this error, if it is a match-count rejection
    pub fn match_count(&self) -> Option<usize> {
        match self {
            EditError::AnchorNotFound { .. } => Some(0),
            EditError::Ambiguous { match_count, .. } => Some(*match_count),
            _ => None,
        }
    }

    /// True when nothing was written because the anchor was not unique
    pub fn is_ambiguous(&self) -> bool {
        self.match_count().is_some()
    }

    /// Build the rejection for a non-unique match count
    pub(crate) fn from_match_count(path: &str, find_block: &str, match_count: usize) -> Self {
        let anchor_preview = truncate_preview(find_block, ANCHOR_PREVIEW_CHARS);
        if match_count == 0 {
            EditError::AnchorNotFound {
                path: path.to_string(),
                anchor_preview,
            }
        } else {
            EditError::Ambiguous {
                path: path.to_string(),
                match_count,
                anchor_preview,
            }
        }
    }
}

/// Maximum characters of an anchor quoted back in rejection messages
pub const ANCHOR_PREVIEW_CHARS: usize = 100;

/// New content produced by replacing a single located span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Full file content after the replacement
    pub new_content: String,
    /// Span of the replaced text in the original content
    pub span: Span,
    /// Text that was replaced, taken from the original content
    pub old_block: String,
    /// Lines touched: the larger of old and new block line counts
    pub lines_changed: usize,
    /// Byte shift (positive = content grew, negative = shrank)
    pub byte_shift: i64,
    /// BLAKE3 checksum of the content after the replacement
    pub new_checksum: String,
}

/// Replace exactly one span of `content` with `replace_block`
///
/// Bytes outside the span are copied unchanged. The caller is responsible
/// for having established that the span is the unique anchor location.
///
/// # Returns
/// * `Ok(Replacement)` - The new content and metadata
/// * `Err(EditError::NoOp)` - The result is byte-identical to `content`
pub fn apply_replacement(
    path: &str,
    content: &str,
    span: Span,
    replace_block: &str,
) -> Result<Replacement, EditError> {
    let old_block = span.slice(content);

    let mut new_content =
        String::with_capacity(content.len() - span.len() + replace_block.len());
    new_content.push_str(&content[..span.byte_start]);
    new_content.push_str(replace_block);
    new_content.push_str(&content[span.byte_end..]);

    if new_content == content {
        return Err(EditError::NoOp {
            path: path.to_string(),
        });
    }

    Ok(Replacement {
        lines_changed: lines_changed(old_block, replace_block),
        byte_shift: replace_block.len() as i64 - span.len() as i64,
        new_checksum: checksum(&new_content),
        old_block: old_block.to_string(),
        span,
        new_content,
    })
}

/// Count lines touched by swapping `old_block` for `new_block`
pub fn lines_changed(old_block: &str, new_block: &str) -> usize {
    old_block.lines().count().max(new_block.lines().count())
}

/// Truncate text to at most `max_chars` characters, marking the cut with `...`
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_replacement_simple() {
        let content = "Hello, world!";
        let result = apply_replacement("t.txt", content, Span::new(7, 12), "Rust").unwrap();

        assert_eq!(result.new_content, "Hello, Rust!");
        assert_eq!(result.old_block, "world");
        // "world" is 5 bytes, "Rust" is 4 bytes, so shift is -1
        assert_eq!(result.byte_shift, -1);
        assert_eq!(result.new_checksum, checksum("Hello, Rust!"));
    }

    #[test]
    fn test_apply_replacement_preserves_surroundings() {
        let content = "a\n    return a + b\nz\n";
        let start = content.find("return").unwrap();
        let span = Span::new(start, start + "return a + b".len());

        let result = apply_replacement("f.py", content, span, "return a * b").unwrap();

        assert_eq!(result.new_content, "a\n    return a * b\nz\n");
        assert_eq!(result.lines_changed, 1);
    }

    #[test]
    fn test_apply_replacement_noop() {
        let content = "x = 1";
        let result = apply_replacement("x.py", content, Span::new(0, 1), "x");

        match result {
            Err(EditError::NoOp { path }) => assert_eq!(path, "x.py"),
            other => panic!("Expected EditError::NoOp, got {:?}", other),
        }
    }

    #[test]
    fn test_lines_changed() {
        assert_eq!(lines_changed("a", "b"), 1);
        assert_eq!(lines_changed("a\nb\nc", "d"), 3);
        assert_eq!(lines_changed("a", ""), 1);
    }

    #[test]
    fn test_truncate_preview() {
        assert_eq!(truncate_preview("short", 10), "short");
        assert_eq!(truncate_preview("abcdefgh", 3), "abc...");
        assert_eq!(truncate_preview("ééé", 2), "éé...");
    }

    #[test]
    fn test_match_count_errors() {
        let not_found = EditError::from_match_count("a.rs", "fn main", 0);
        assert_eq!(not_found.match_count(), Some(0));
        assert!(not_found.to_string().contains("not found"));

        let ambiguous = EditError::from_match_count("a.rs", "fn main", 2);
        assert_eq!(ambiguous.match_count(), Some(2));
        assert!(ambiguous.to_string().contains("found 2 times"));

        let noop = EditError::NoOp { path: "a.rs".to_string() };
        assert!(!noop.is_ambiguous());
    }
}
