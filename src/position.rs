use serde::Serialize;

/// Position in a text file (line and column numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed, in bytes)
    pub column: usize,
}

/// Byte span in a text file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    /// Starting byte offset
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
}

impl Span {
    pub fn new(byte_start: usize, byte_end: usize) -> Self {
        Self { byte_start, byte_end }
    }

    pub fn len(&self) -> usize {
        self.byte_end - self.byte_start
    }

    pub fn is_empty(&self) -> bool {
        self.byte_end == self.byte_start
    }

    /// Borrow the text covered by this span
    pub fn slice<'a>(&self, content: &'a str) -> &'a str {
        &content[self.byte_start..self.byte_end]
    }
}

/// Convert a byte offset to line and column position
///
/// Offsets past the end of the content are clamped to the end.
pub fn byte_to_position(content: &str, byte_offset: usize) -> Position {
    let offset = byte_offset.min(content.len());
    let before = &content.as_bytes()[..offset];

    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);

    Position {
        line,
        column: offset - line_start + 1,
    }
}

/// Split content into per-line spans
///
/// Each span covers the line's text without its terminator. `\r\n`, `\n` and a
/// lone `\r` all end a line, matching how `normalize` splits lines, so
/// replacing a span never touches line endings. A trailing newline does not
/// produce an extra empty line.
pub fn line_spans(content: &str) -> Vec<Span> {
    let bytes = content.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                spans.push(Span::new(start, i));
                i += 2;
                start = i;
            }
            b'\n' | b'\r' => {
                spans.push(Span::new(start, i));
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }

    if start < bytes.len() {
        spans.push(Span::new(start, bytes.len()));
    }

    spans
}

/// Byte offset just past the line terminator that starts at `line_end`
///
/// Returns `line_end` unchanged when the line is the last one and has no
/// terminator.
pub fn terminator_end(content: &str, line_end: usize) -> usize {
    match content.as_bytes().get(line_end..) {
        Some([b'\r', b'\n', ..]) => line_end + 2,
        Some([b'\n', ..]) | Some([b'\r', ..]) => line_end + 1,
        _ => line_end,
    }
}
