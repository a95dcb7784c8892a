//! HTML escaping helpers.

/// Escape the three HTML metacharacters `&`, `<` and `>`.
///
/// This is the first pipeline stage; quotes are left alone because text
/// content never lands inside an attribute without [`escape_attr`].
///
/// # Examples
///
/// ```
/// use vd_renderer::escape_html;
///
/// assert_eq!(escape_html("<b>a & b</b>"), "&lt;b&gt;a &amp; b&lt;/b&gt;");
/// ```
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Make already-escaped text safe inside a double-quoted attribute.
#[must_use]
pub(crate) fn escape_attr(s: &str) -> String {
    s.replace('"', "&quot;")
}

/// Reverse [`escape_html`] and [`escape_attr`].
#[must_use]
pub(crate) fn unescape_html(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Strip tags from rendered inline HTML and unescape the remaining text.
#[must_use]
pub(crate) fn plain_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    unescape_html(&text)
}
