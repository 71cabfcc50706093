// Whitespace canonicalization for fuzzy comparison
pub mod normalize;

// Position tracking module
pub mod position;

// File operations module
pub mod file;

// Anchor counting and location
pub mod anchor;

// Replacement engine and error types
pub mod edit;

// Language detection and grammar mapping
pub mod language;

// Structural validation
pub mod validate;

// Undo history and revert
pub mod history;

// Advisory linting
pub mod lint;

// Editor configuration
pub mod config;

// Editor facade
pub mod editor;

// JSON request/response module
pub mod json;

// Re-exports
pub use normalize::{collapse_whitespace, normalize};
pub use position::{Position, Span, byte_to_position, line_spans, terminator_end};
pub use file::{FileContent, FileError, checksum, read_file, write_file};
pub use anchor::{MatchMode, count_matches, find_unique, locate};
pub use edit::{EditError, Replacement, apply_replacement, truncate_preview};
pub use language::{Grammar, Language, detect_grammar, detect_language};
pub use validate::{Validation, validate};
pub use history::{DEFAULT_MAX_HISTORY, EditHistoryEntry, History, revert_now};
pub use lint::{CommandLinter, LintReport, Linter};
pub use config::{ConfigError, EditorConfig, LintConfig};
pub use editor::{AnchoredEditor, EditResult};
pub use json::{EditRequest, EditResponse, generate_execution_id, resolve_execution_id};
