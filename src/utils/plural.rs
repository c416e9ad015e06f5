//! Counted nouns for log lines.

/// `"1 file"`, `"3 files"`, `"0 bundles"`.
///
/// Only the last word is pluralized, so `"ungrouped file"` becomes
/// `"ungrouped files"`. Nouns ending in `s`, `x` or `sh` take `es`.
pub fn plural_count(count: usize, noun: &str) -> String {
    if count == 1 {
        return format!("1 {noun}");
    }
    let suffix = if noun.ends_with('s') || noun.ends_with('x') || noun.ends_with("sh") {
        "es"
    } else {
        "s"
    };
    format!("{count} {noun}{suffix}")
}
