use serde::{Deserialize, Serialize};
use std::path::Path;

/// File types anchor-edit recognizes by extension
///
/// Each variant maps to exactly one [`Grammar`], which decides how edited
/// content is structurally validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// Rust (.rs)
    Rust,
    /// C (.c, .h)
    C,
    /// C++ (.cpp, .cc, .cxx, .hpp, .hxx, .hh)
    Cpp,
    /// Java (.java)
    Java,
    /// JavaScript (.js, .mjs, .cjs, .jsx)
    JavaScript,
    /// TypeScript (.ts, .tsx)
    TypeScript,
    /// Go (.go)
    Go,
    /// C# (.cs)
    CSharp,
    /// Python (.py, .pyi)
    Python,
    /// JSON (.json)
    Json,
    /// YAML (.yaml, .yml)
    Yaml,
    /// Unknown or unsupported file type
    Unknown,
}

/// Validation strategy applied to a file after an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grammar {
    /// Indentation-structured script, checked with a full parse
    Script,
    /// JSON document, checked by deserializing
    Json,
    /// YAML document stream, checked by deserializing
    Yaml,
    /// Brace-delimited language, checked for bracket balance
    Brace,
    /// No structural check beyond empty-file corruption
    Unknown,
}

impl Language {
    /// Every language with a structural check, in detection order
    pub const KNOWN: [Language; 11] = [
        Language::Rust,
        Language::C,
        Language::Cpp,
        Language::Java,
        Language::JavaScript,
        Language::TypeScript,
        Language::Go,
        Language::CSharp,
        Language::Python,
        Language::Json,
        Language::Yaml,
    ];

    /// Get the file extensions associated with this language
    pub fn extensions(&self) -> &[&str] {
        match self {
            Language::Rust => &["rs"],
            Language::C => &["c", "h"],
            Language::Cpp => &["cpp", "cc", "cxx", "hpp", "hxx", "hh"],
            Language::Java => &["java"],
            Language::JavaScript => &["js", "mjs", "cjs", "jsx"],
            Language::TypeScript => &["ts", "tsx"],
            Language::Go => &["go"],
            Language::CSharp => &["cs"],
            Language::Python => &["py", "pyi"],
            Language::Json => &["json"],
            Language::Yaml => &["yaml", "yml"],
            Language::Unknown => &[],
        }
    }

    /// Get the language name as a string
    pub fn name(&self) -> &str {
        match self {
            Language::Rust => "Rust",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Java => "Java",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Go => "Go",
            Language::CSharp => "C#",
            Language::Python => "Python",
            Language::Json => "JSON",
            Language::Yaml => "YAML",
            Language::Unknown => "Unknown",
        }
    }

    /// The grammar used to validate files of this language
    ///
    /// This is the single place a language is bound to a validation strategy.
    pub fn grammar(&self) -> Grammar {
        match self {
            Language::Python => Grammar::Script,
            Language::Json => Grammar::Json,
            Language::Yaml => Grammar::Yaml,
            Language::Rust
            | Language::C
            | Language::Cpp
            | Language::Java
            | Language::JavaScript
            | Language::TypeScript
            | Language::Go
            | Language::CSharp => Grammar::Brace,
            Language::Unknown => Grammar::Unknown,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the language from a file path
///
/// The extension is compared case-insensitively. Unrecognized or missing
/// extensions yield `Language::Unknown`.
///
/// # Examples
/// ```
/// use anchor_edit::{Language, detect_language};
/// assert_eq!(detect_language("main.rs"), Language::Rust);
/// assert_eq!(detect_language("config.YML"), Language::Yaml);
/// assert_eq!(detect_language("script.py"), Language::Python);
/// assert_eq!(detect_language("unknown.xyz"), Language::Unknown);
/// ```
pub fn detect_language<P: AsRef<Path>>(path: P) -> Language {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    Language::KNOWN
        .into_iter()
        .find(|language| language.extensions().contains(&extension.as_str()))
        .unwrap_or(Language::Unknown)
}

/// Shorthand for `detect_language(path).grammar()`
pub fn detect_grammar<P: AsRef<Path>>(path: P) -> Grammar {
    detect_language(path).grammar()
}
