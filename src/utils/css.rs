//! CSS utilities: `url(...)` cache busting.
//!
//! Appends `?<version>` to every resource referenced from a stylesheet, so
//! images and fonts are re-fetched whenever the stylesheet is rebuilt.

use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::asset::version::compute_version;

/// `url(` + optional quote + target + optional quote + `)`
static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(['"]?)([^'")]*)(['"]?)\s*\)"#).expect("valid url() pattern")
});

/// Append `?version` to every `url(...)` target.
///
/// `data:` URIs, empty targets and targets that already carry a query are
/// left alone.
pub fn bust_urls<'a>(css: &'a str, version: &str) -> Cow<'a, str> {
    URL_PATTERN.replace_all(css, |caps: &Captures| {
        let target = &caps[2];
        if target.is_empty() || target.starts_with("data:") || target.contains('?') {
            return caps[0].to_string();
        }
        format!("url({}{}?{}{})", &caps[1], target, version, &caps[3])
    })
}

/// Rewrite a stylesheet in place, versioned by its own modification time.
///
/// Returns whether the file changed.
pub fn bust_file(path: &Path) -> std::io::Result<bool> {
    let Some(version) = compute_version(path) else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("couldn't find css file {}", path.display()),
        ));
    };
    let css = std::fs::read_to_string(path)?;
    let busted = bust_urls(&css, &version);
    if busted == css {
        return Ok(false);
    }
    std::fs::write(path, busted.as_bytes())?;
    Ok(true)
}
