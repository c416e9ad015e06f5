//! HTML fragments for asset references.
//!
//! - `escape_attr()` - attribute value escaping
//! - `script_tag()`, `stylesheet_link()` - the tags the resolver emits

use std::borrow::Cow;

// =============================================================================
// escaping
// =============================================================================

/// Escape a double-quoted attribute value; borrows when nothing changes.
pub fn escape_attr(s: &str) -> Cow<'_, str> {
    let Some(first) = s.find(['<', '>', '&', '"', '\'']) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len() + 8);
    out.push_str(&s[..first]);
    for c in s[first..].chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

// =============================================================================
// tags
// =============================================================================

/// `<script type="text/javascript" src="URL"></script>`
pub fn script_tag(src: &str) -> String {
    format!(
        r#"<script type="text/javascript" src="{}"></script>"#,
        escape_attr(src)
    )
}

/// `<link rel="stylesheet" type="text/css" href="URL" media="MEDIA"/>`
pub fn stylesheet_link(href: &str, media: &str) -> String {
    format!(
        r#"<link rel="stylesheet" type="text/css" href="{}" media="{}"/>"#,
        escape_attr(href),
        escape_attr(media)
    )
}

// =============================================================================
// tests
// =============================================================================
