//! Build errors.
//!
//! Library code returns [`BuildError`]; the CLI wraps it in `anyhow` for
//! context and printing.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::transform::TransformError;

/// Error that aborts (or partially fails) a build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot prepare output directory {}: {source}", path.display())]
    PrepareOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("lint reported {warnings} warning(s) in {files} file(s) and lint.failonwarning is set")]
    Lint { warnings: usize, files: usize },

    #[error("couldn't find file {}; check the group's include patterns", path.display())]
    MissingMember { path: PathBuf },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// One or more groups failed to bundle; the others were written.
    #[error("{} bundle(s) failed:{}", .0.len(), format_failures(.0))]
    Bundle(Vec<(String, BuildError)>),
}

impl BuildError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn format_failures(failures: &[(String, BuildError)]) -> String {
    failures
        .iter()
        .map(|(group, err)| format!("\n  {group}: {err}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_error_lists_groups() {
        let err = BuildError::Bundle(vec![
            (
                "js.asset.vendor".into(),
                BuildError::MissingMember {
                    path: PathBuf::from("/out/lib/a.js"),
                },
            ),
            (
                "css.asset.print".into(),
                BuildError::io("/out/print.css", std::io::Error::other("disk full")),
            ),
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 bundle(s) failed:"));
        assert!(msg.contains("js.asset.vendor: couldn't find file /out/lib/a.js"));
        assert!(msg.contains("css.asset.print: /out/print.css: disk full"));
    }

    #[test]
    fn test_lint_error_message() {
        let err = BuildError::Lint {
            warnings: 3,
            files: 2,
        };
        assert_eq!(
            err.to_string(),
            "lint reported 3 warning(s) in 2 file(s) and lint.failonwarning is set"
        );
    }
}
