/// Number of spaces a tab expands to during normalization
pub const TAB_WIDTH: usize = 4;

/// Canonicalize text for comparison
///
/// Tabs become four spaces, CRLF and lone CR become LF, and trailing
/// whitespace is stripped from every line. The result is only ever compared
/// against other normalized text; it is never written back to disk.
///
/// # Example
/// ```
/// use anchor_edit::normalize;
/// assert_eq!(normalize("\tx = 1  \r\ny = 2\r"), "    x = 1\ny = 2\n");
/// ```
pub fn normalize(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    unified
        .split('\n')
        .map(|line| expand_tabs(line).trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Expand every tab in a single line to `TAB_WIDTH` spaces
pub fn expand_tabs(line: &str) -> String {
    line.replace('\t', &" ".repeat(TAB_WIDTH))
}

/// Collapse every run of whitespace (including newlines) to a single space
///
/// Used as the last-resort fuzzy comparison: token order is preserved but
/// indentation and line breaks are ignored.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
