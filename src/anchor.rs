//! Anchor search: counting and locating a find-block inside file content.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::edit::EditError;
use crate::normalize::{collapse_whitespace, expand_tabs, normalize};
use crate::position::{Span, line_spans, terminator_end};

/// How a find-block is compared against file content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Byte-exact substring comparison
    #[default]
    Strict,
    /// Whitespace-normalized comparison over whole lines
    Fuzzy,
}

impl MatchMode {
    pub fn from_strict(strict: bool) -> Self {
        if strict { MatchMode::Strict } else { MatchMode::Fuzzy }
    }
}

/// Count occurrences of `find_block` in `content`
///
/// Occurrences may overlap: `"}\n}"` is found twice in `"}\n}\n}"`. Strict
/// mode compares bytes. Fuzzy mode compares normalized text and, if that
/// finds nothing, retries with every whitespace run collapsed to a single
/// space. An empty find-block never matches.
pub fn count_matches(content: &str, find_block: &str, mode: MatchMode) -> usize {
    if find_block.is_empty() {
        return 0;
    }

    match mode {
        MatchMode::Strict => match_offsets(content, find_block).len(),
        MatchMode::Fuzzy => FuzzyText::new(content).hits(find_block).len(),
    }
}

/// Locate every line range of `content` matching `find_block` line by line
///
/// Each find-block line must equal the corresponding content line once both
/// have tabs expanded and trailing whitespace removed. If no range matches,
/// the comparison is retried ignoring leading indentation as well. Returned
/// spans cover whole lines. They include the last line's terminator only
/// when `find_block` itself ends with one.
pub fn locate(content: &str, find_block: &str) -> Vec<Span> {
    let lines = line_spans(content);
    locate_lines(content, &lines, find_block)
        .into_iter()
        .map(|range| line_range_span(content, &lines, range, find_block))
        .collect()
}

/// Find the single span `find_block` refers to, or reject
///
/// This is the only gate between a request and the replacement engine: any
/// count other than exactly one produces a rejection and nothing is written.
/// In fuzzy mode the one counted occurrence must also sit inside the one
/// whole-line range that gets replaced.
pub fn find_unique(
    path: &str,
    content: &str,
    find_block: &str,
    mode: MatchMode,
) -> Result<Span, EditError> {
    match mode {
        MatchMode::Strict => {
            let offsets = match_offsets(content, find_block);
            debug!(path, ?mode, count = offsets.len(), "anchor match count");
            match offsets.as_slice() {
                [start] => Ok(Span::new(*start, *start + find_block.len())),
                _ => Err(EditError::from_match_count(path, find_block, offsets.len())),
            }
        }
        MatchMode::Fuzzy => {
            let hits = FuzzyText::new(content).hits(find_block);
            debug!(path, ?mode, count = hits.len(), "anchor match count");
            let [hit] = hits.as_slice() else {
                return Err(EditError::from_match_count(path, find_block, hits.len()));
            };

            let lines = line_spans(content);
            let (containing, others): (Vec<_>, Vec<_>) = locate_lines(content, &lines, find_block)
                .into_iter()
                .partition(|&(first, last)| first <= hit.0 && hit.1 <= last);

            match (containing.as_slice(), others.len()) {
                ([range], 0) => Ok(line_range_span(content, &lines, *range, find_block)),
                ([], 0) => {
                    debug!(path, "fuzzy occurrence does not cover whole lines");
                    Err(EditError::from_match_count(path, find_block, 0))
                }
                (_, others) => {
                    debug!(path, others, "fuzzy anchor also matches elsewhere line by line");
                    Err(EditError::from_match_count(path, find_block, 1 + others))
                }
            }
        }
    }
}

/// Start offsets of every occurrence of `needle`, overlapping ones included
fn match_offsets(haystack: &str, needle: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    if needle.is_empty() {
        return offsets;
    }

    let mut from = 0;
    while let Some(found) = haystack[from..].find(needle) {
        let start = from + found;
        offsets.push(start);
        let step = haystack[start..].chars().next().map_or(1, char::len_utf8);
        from = start + step;
    }
    offsets
}

/// Normalized and collapsed views of content, with a way back to line numbers
struct FuzzyText {
    normalized: String,
    collapsed: String,
    /// Line index of every token in `collapsed`
    token_lines: Vec<usize>,
}

impl FuzzyText {
    fn new(content: &str) -> Self {
        let normalized = normalize(content);
        let mut tokens = Vec::new();
        let mut token_lines = Vec::new();
        for (line, text) in normalized.split('\n').enumerate() {
            for token in text.split_whitespace() {
                tokens.push(token);
                token_lines.push(line);
            }
        }
        let collapsed = tokens.join(" ");

        Self { normalized, collapsed, token_lines }
    }

    /// First and last line touched by every fuzzy occurrence of `find_block`
    fn hits(&self, find_block: &str) -> Vec<(usize, usize)> {
        let needle = normalize(find_block);
        if !needle.trim().is_empty() {
            let bytes = self.normalized.as_bytes();
            let newlines = |end: usize| bytes[..end].iter().filter(|&&b| b == b'\n').count();
            let hits: Vec<_> = match_offsets(&self.normalized, &needle)
                .into_iter()
                .map(|start| (newlines(start), newlines(start + needle.len() - 1)))
                .collect();
            if !hits.is_empty() {
                return hits;
            }
        }

        let needle = collapse_whitespace(find_block);
        if needle.is_empty() {
            return Vec::new();
        }
        let bytes = self.collapsed.as_bytes();
        let token = |end: usize| bytes[..end].iter().filter(|&&b| b == b' ').count();
        match_offsets(&self.collapsed, &needle)
            .into_iter()
            .map(|start| {
                let first = self.token_lines[token(start)];
                let last = self.token_lines[token(start + needle.len() - 1)];
                (first, last)
            })
            .collect()
    }
}

/// Line ranges matching `find_block`, exact first, then ignoring indentation
fn locate_lines(content: &str, lines: &[Span], find_block: &str) -> Vec<(usize, usize)> {
    let needle = find_lines(find_block);
    if needle.iter().all(|line| line.trim().is_empty()) {
        return Vec::new();
    }

    let exact = scan_lines(content, lines, &needle, |line, wanted| {
        expand_tabs(line).trim_end() == wanted
    });
    if !exact.is_empty() {
        return exact;
    }

    scan_lines(content, lines, &needle, |line, wanted| {
        line.trim() == wanted.trim_start()
    })
}

fn line_range_span(content: &str, lines: &[Span], (first, last): (usize, usize), find_block: &str) -> Span {
    let end = if ends_with_terminator(find_block) {
        terminator_end(content, lines[last].byte_end)
    } else {
        lines[last].byte_end
    };
    Span::new(lines[first].byte_start, end)
}

fn ends_with_terminator(text: &str) -> bool {
    text.ends_with('\n') || text.ends_with('\r')
}

/// Normalized find-block lines; a final terminator does not add an empty line
fn find_lines(find_block: &str) -> Vec<String> {
    let normalized = normalize(find_block);
    let mut lines: Vec<String> = normalized.split('\n').map(str::to_string).collect();
    if ends_with_terminator(find_block) {
        lines.pop();
    }
    lines
}

fn scan_lines<F>(content: &str, lines: &[Span], needle: &[String], line_matches: F) -> Vec<(usize, usize)>
where
    F: Fn(&str, &str) -> bool,
{
    if needle.is_empty() || needle.len() > lines.len() {
        return Vec::new();
    }

    let mut found = Vec::new();
    let mut i = 0;
    while i + needle.len() <= lines.len() {
        let window = &lines[i..i + needle.len()];
        let hit = window
            .iter()
            .zip(needle)
            .all(|(span, wanted)| line_matches(span.slice(content), wanted));

        if hit {
            found.push((i, i + needle.len() - 1));
            i += needle.len();
        } else {
            i += 1;
        }
    }

    found
}
