//! HTML escaping for untrusted strings echoed back in error payloads.

/// Escapes `&`, `<`, `>`, `"` and `'` so the string is inert in HTML.
///
/// ```
/// assert_eq!(
///     krino_core::escape_html("<script>alert('x')</script>"),
///     "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
/// );
/// ```
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
