//! Source transformers: lint, optimize (JS) and minify (CSS).
//!
//! # Module Structure
//!
//! ```text
//! transform/
//! ├── lint.rs     # Linter trait impl (oxc parser + text rules), LintOptions
//! ├── minify.rs   # Optimizer impls: OxcOptimizer, CssMinifier
//! └── mod.rs      # Traits, Diagnostic, TransformError (this file)
//! ```
//!
//! The pipeline only talks to the traits, so tests can swap in stubs.

mod lint;
mod minify;

pub use lint::{LintOptions, OxcLinter};
pub use minify::{CssMinifier, OxcOptimizer, copy_verbatim};

use std::path::{Path, PathBuf};

use thiserror::Error;

/// One lint finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// A transformer could not process a file.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl TransformError {
    pub fn read(path: &Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Checks one source file and reports findings.
///
/// Findings are data, not errors: only an unreadable file is an `Err`.
pub trait Linter: Send + Sync {
    fn check(&self, source: &Path, options: &LintOptions) -> Result<Vec<Diagnostic>, TransformError>;
}

/// Writes a transformed copy of `source` to `dest`.
///
/// Implementations must create missing parent directories of `dest`.
pub trait Optimizer: Send + Sync {
    fn transform(&self, source: &Path, dest: &Path) -> Result<(), TransformError>;
}

/// Read a source file as UTF-8.
fn read_source(path: &Path) -> Result<String, TransformError> {
    std::fs::read_to_string(path).map_err(|e| TransformError::read(path, e))
}

/// Write output, creating parent directories.
fn write_output(path: &Path, content: &[u8]) -> Result<(), TransformError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| TransformError::write(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| TransformError::write(path, e))
}

/// 1-based line of a byte offset.
fn line_of(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_of() {
        let src = "a\nbb\nccc";
        assert_eq!(line_of(src, 0), 1);
        assert_eq!(line_of(src, 2), 2);
        assert_eq!(line_of(src, 5), 3);
        assert_eq!(line_of(src, 999), 3);
    }

    #[test]
    fn test_diagnostic_display() {
        assert_eq!(
            Diagnostic::new(4, "line too long").to_string(),
            "line 4: line too long"
        );
    }

    #[test]
    fn test_write_output_creates_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("a/b/c.js");
        write_output(&dest, b"x").unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"x");
    }
}
