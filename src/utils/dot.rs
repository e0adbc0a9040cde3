//! DOT string escaping.

/// Escape text for use inside a double-quoted DOT identifier or label.
///
/// Backslashes and quotes are escaped, line feeds become the DOT line break `\n` and carriage
/// returns are dropped. Everything else is passed through, so assembly names with `<`, `>` or
/// non-ASCII characters render as written.
///
/// # Arguments
///
/// * `text` - The string to escape
///
/// # Examples
///
/// ```rust
/// use refscope::utils::escape_dot;
///
/// assert_eq!(escape_dot("Lib\nLeaf"), "Lib\\nLeaf");
/// assert_eq!(escape_dot(r"C:\src"), r"C:\\src");
/// ```
#[must_use]
pub fn escape_dot(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}
