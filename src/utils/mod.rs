//! Project-specific utilities live here.

/// Escape the HTML metacharacters `& < > " '` so untrusted text can be echoed
/// into a response body.
///
/// Not idempotent: escaping twice turns `&lt;` into `&amp;lt;`. Apply once, when
/// the value is written into a response, never when it is read from a request.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
