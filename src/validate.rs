//! Structural validation of edited content.
//!
//! The check is chosen by [`Grammar`], which is derived from the file path.
//! It only answers "is this still well-formed", never "is this correct".

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};
use tree_sitter::{Node, Parser};

use crate::language::{Grammar, Language, detect_language};

/// Outcome of a structural check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    /// Whether the content is structurally well-formed
    pub valid: bool,
    /// Why the content was rejected (or a note for unchecked file types)
    pub message: Option<String>,
    /// Language detected from the path
    pub language: Language,
    /// Grammar the check was dispatched on
    pub grammar: Grammar,
}

/// Validate `new_content` as the next version of the file at `path`
///
/// `original_content` is only consulted for file types without a grammar,
/// where emptying a non-empty file is treated as corruption.
pub fn validate<P: AsRef<Path>>(path: P, new_content: &str, original_content: &str) -> Validation {
    let path = path.as_ref();
    let language = detect_language(path);
    let grammar = language.grammar();
    debug!(path = %path.display(), %language, ?grammar, "running structural validation");

    let outcome = match grammar {
        Grammar::Script => check_script(new_content),
        Grammar::Json => check_json(new_content),
        Grammar::Yaml => check_yaml(new_content),
        Grammar::Brace => check_brackets(new_content, language),
        Grammar::Unknown => {
            warn!(
                path = %path.display(),
                "no structural check for this file type; only empty-file corruption is detected"
            );
            check_not_emptied(new_content, original_content)
        }
    };

    match outcome {
        Ok(()) => Validation {
            valid: true,
            message: None,
            language,
            grammar,
        },
        Err(reason) => Validation {
            valid: false,
            message: Some(reason),
            language,
            grammar,
        },
    }
}

fn check_script(content: &str) -> Result<(), String> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| format!("failed to load Python grammar: {e}"))?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| "parse failed - no tree returned".to_string())?;

    let root = tree.root_node();
    if !root.has_error() {
        return Ok(());
    }

    match first_error_node(root) {
        Some(node) if node.is_missing() => Err(format!(
            "line {}: syntax error, missing '{}'",
            node.start_position().row + 1,
            node.kind()
        )),
        Some(node) => Err(format!(
            "line {}: syntax error near '{}'",
            node.start_position().row + 1,
            snippet(&content[node.byte_range()])
        )),
        None => Err("syntax error".to_string()),
    }
}

/// Depth-first search for the first ERROR or MISSING node
fn first_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error_node(child) {
            return Some(found);
        }
    }
    None
}

fn snippet(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or("").trim();
    crate::edit::truncate_preview(first_line, 40)
}

fn check_json(content: &str) -> Result<(), String> {
    serde_json::from_str::<serde_json::Value>(content)
        .map(|_| ())
        .map_err(|e| format!("invalid JSON: {e}"))
}

fn check_yaml(content: &str) -> Result<(), String> {
    for document in serde_yaml::Deserializer::from_str(content) {
        serde_yaml::Value::deserialize(document).map_err(|e| format!("invalid YAML: {e}"))?;
    }
    Ok(())
}

fn check_not_emptied(new_content: &str, original_content: &str) -> Result<(), String> {
    if new_content.is_empty() && !original_content.is_empty() {
        return Err("edit would empty a non-empty file (likely corruption)".to_string());
    }
    Ok(())
}

/// Streaming bracket balance over `(){}[]`
///
/// Brackets inside string literals, character literals and comments are
/// skipped. Reports the first unmatched or mismatched closer, or the
/// innermost opener left unclosed at end of input.
fn check_brackets(content: &str, language: Language) -> Result<(), String> {
    let js_like = matches!(language, Language::JavaScript | Language::TypeScript);
    let backtick_strings = js_like || language == Language::Go;

    let chars: Vec<char> = content.chars().collect();
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => line += 1,
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    if chars[i] == '\n' {
                        line += 1;
                    }
                    i += 1;
                }
                i += 2;
                continue;
            }
            '@' if language == Language::CSharp => {
                // @"..." and @$"..." take backslashes literally
                let quote = match (chars.get(i + 1).copied(), chars.get(i + 2).copied()) {
                    (Some('"'), _) => Some(i + 1),
                    (Some('$'), Some('"')) => Some(i + 2),
                    _ => None,
                };
                if let Some(quote) = quote {
                    i = skip_verbatim_string(&chars, quote, &mut line);
                    continue;
                }
            }
            '"' => {
                i = skip_string(&chars, i, '"', &mut line);
                continue;
            }
            '`' if backtick_strings => {
                i = skip_string(&chars, i, '`', &mut line);
                continue;
            }
            '\'' if js_like => {
                i = skip_string(&chars, i, '\'', &mut line);
                continue;
            }
            '\'' => {
                // Lifetimes and other lone quotes fall through untouched
                if let Some(end) = char_literal_end(&chars, i) {
                    i = end + 1;
                    continue;
                }
            }
            '(' | '[' | '{' => stack.push((c, line)),
            ')' | ']' | '}' => {
                let expected = opener_for(c);
                match stack.pop() {
                    Some((open, _)) if open == expected => {}
                    Some((open, open_line)) => {
                        return Err(format!(
                            "line {line}: mismatched '{c}', expected closer for '{open}' opened on line {open_line}"
                        ));
                    }
                    None => return Err(format!("line {line}: unmatched closing '{c}'")),
                }
            }
            _ => {}
        }
        i += 1;
    }

    match stack.last() {
        Some((open, open_line)) => Err(format!("line {open_line}: unclosed '{open}'")),
        None => Ok(()),
    }
}

fn opener_for(closer: char) -> char {
    match closer {
        ')' => '(',
        ']' => '[',
        _ => '{',
    }
}

/// Index just past the closing `quote`, or end of input if unterminated
fn skip_string(chars: &[char], start: usize, quote: char, line: &mut usize) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                if chars.get(i + 1) == Some(&'\n') {
                    *line += 1;
                }
                i += 2;
            }
            '\n' => {
                *line += 1;
                i += 1;
            }
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// Index just past a C# verbatim string whose opening quote is at `start`
///
/// A doubled `""` is an escaped quote; there are no backslash escapes.
fn skip_verbatim_string(chars: &[char], start: usize, line: &mut usize) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '"' if chars.get(i + 1) == Some(&'"') => i += 2,
            '"' => return i + 1,
            '\n' => {
                *line += 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    chars.len()
}

/// Index of the closing quote of a character literal starting at `start`
fn char_literal_end(chars: &[char], start: usize) -> Option<usize> {
    match chars.get(start + 1).copied() {
        Some('\\') => (start + 3..chars.len().min(start + 12)).find(|&j| chars[j] == '\''),
        Some('\'') | Some('\n') | None => None,
        Some(_) => (chars.get(start + 2) == Some(&'\'')).then_some(start + 2),
    }
}
