//! DOT format helpers for Graphviz export of call graphs and control-flow graphs.

/// Escapes a string for use inside a quoted DOT label or identifier.
///
/// Quotes, backslashes, newlines and angle brackets are escaped; carriage
/// returns are dropped.
///
/// ```rust
/// use cs2scope::utils::escape_dot;
///
/// assert_eq!(escape_dot("$int0 = \"a\""), "$int0 = \\\"a\\\"");
/// ```
#[must_use]
pub fn escape_dot(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            '<' => escaped.push_str("\\<"),
            '>' => escaped.push_str("\\>"),
            _ => escaped.push(c),
        }
    }
    escaped
}
