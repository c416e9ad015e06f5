//! Ant-style pattern matching against a base directory.
//!
//! Patterns are relative to the base directory and use `/` separators:
//!
//! | Pattern       | Matches                                   |
//! |---------------|-------------------------------------------|
//! | `*.js`        | `a.js` (top level only)                   |
//! | `lib/*.js`    | `lib/a.js`, not `lib/x/b.js`              |
//! | `**/*.css`    | every `.css` file at any depth            |
//! | `vendor/`     | everything below `vendor` (implied `**`)  |
//!
//! Version-control metadata and editor temp files are always skipped.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use jwalk::WalkDir;

use crate::log;
use crate::utils::path::rel_slash;

/// Patterns skipped by every lookup (VCS directories, temp and backup files).
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/*~",
    "**/#*#",
    "**/.#*",
    "**/%*%",
    "**/._*",
    "**/CVS/**",
    "**/.cvsignore",
    "**/SCCS/**",
    "**/vssver.scc",
    "**/.svn/**",
    "**/.DS_Store",
    "**/.git/**",
    "**/.gitattributes",
    "**/.gitignore",
    "**/.gitmodules",
    "**/.hg/**",
    "**/.hgignore",
    "**/.bzr/**",
    "**/.bzrignore",
];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Resolves patterns into files below a base directory.
///
/// Implementations must return absolute paths in a stable order.
pub trait PathMatcher: Send + Sync {
    fn find(&self, pattern: &str, base: &Path) -> Vec<PathBuf>;
}

/// Normalize an Ant-style pattern into `glob` syntax.
fn normalize_pattern(pattern: &str) -> String {
    let mut pattern = pattern.trim().replace('\\', "/");
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest.to_string();
    }
    let mut pattern = pattern.trim_start_matches('/').to_string();
    if pattern.ends_with('/') {
        pattern.push_str("**");
    }
    pattern
}

/// Compile a pattern, logging a warning when it is invalid.
fn compile(pattern: &str) -> Option<Pattern> {
    match Pattern::new(&normalize_pattern(pattern)) {
        Ok(p) => Some(p),
        Err(e) => {
            log!("warn"; "invalid pattern '{}': {}", pattern, e);
            None
        }
    }
}

/// Filesystem-backed matcher walking the base directory with `jwalk`.
pub struct FsMatcher {
    excludes: Vec<Pattern>,
}

impl Default for FsMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FsMatcher {
    pub fn new() -> Self {
        let excludes = DEFAULT_EXCLUDES
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect();
        Self { excludes }
    }

    fn is_excluded(&self, rel: &str) -> bool {
        self.excludes
            .iter()
            .any(|p| p.matches_with(rel, MATCH_OPTIONS))
    }
}

impl PathMatcher for FsMatcher {
    fn find(&self, pattern: &str, base: &Path) -> Vec<PathBuf> {
        if !base.is_dir() {
            return vec![];
        }
        let Some(pattern) = compile(pattern) else {
            return vec![];
        };

        let mut files: Vec<PathBuf> = WalkDir::new(base)
            .skip_hidden(false)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path())
            .filter(|path| {
                rel_slash(path, base).is_some_and(|rel| {
                    !self.is_excluded(&rel) && pattern.matches_with(&rel, MATCH_OPTIONS)
                })
            })
            .collect();
        files.sort();
        files
    }
}

// ============================================================================
// tests
// ============================================================================
