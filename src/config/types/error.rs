//! Configuration errors.

use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't read config `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file `{0}` not found")]
    NotFound(PathBuf),

    #[error("invalid TOML in `{0}`")]
    Toml(PathBuf, #[source] toml::de::Error),

    #[error("invalid properties in `{path}`, line {line}: {message}")]
    Properties {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Every problem found by validation, reported together.
    #[error("{0}")]
    Invalid(ConfigDiagnostics),
}

// ============================================================================
// diagnostics
// ============================================================================

/// One invalid key.
#[derive(Debug, Clone)]
pub struct ConfigDiagnostic {
    pub key: String,
    pub message: String,
    pub hint: Option<String>,
}

impl ConfigDiagnostic {
    pub fn hint(&mut self, hint: impl Into<String>) -> &mut Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}: {}", self.key.cyan(), self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " {}", format!("({hint})").dimmed())?;
        }
        Ok(())
    }
}

/// Problems collected while validating a loaded configuration.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    problems: Vec<ConfigDiagnostic>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem; chain [`ConfigDiagnostic::hint`] to add a fix.
    pub fn push(
        &mut self,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> &mut ConfigDiagnostic {
        self.problems.push(ConfigDiagnostic {
            key: key.into(),
            message: message.into(),
            hint: None,
        });
        let last = self.problems.len() - 1;
        &mut self.problems[last]
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn into_result(self) -> Result<(), ConfigError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(self))
        }
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = crate::utils::plural::plural_count(self.problems.len(), "problem");
        write!(f, "{} ({count})", "invalid configuration".red().bold())?;
        for problem in &self.problems {
            write!(f, "\n{problem}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_config_error_display() {
        let io_err = ConfigError::Io(
            PathBuf::from("bale.toml"),
            Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert!(io_err.to_string().contains("bale.toml"));

        let props_err = ConfigError::Properties {
            path: PathBuf::from("bale.properties"),
            line: 3,
            message: "missing key".into(),
        };
        assert!(props_err.to_string().contains("line 3"));
    }

    #[test]
    fn test_diagnostics_into_result() {
        assert!(ConfigDiagnostics::new().into_result().is_ok());

        let mut diag = ConfigDiagnostics::new();
        diag.push("gzip", "expected a boolean").hint("use true or false");
        diag.push("css.line.break", "expected an integer");
        assert!(!diag.is_empty());

        let text = diag.into_result().unwrap_err().to_string();
        assert!(text.contains("2 problems"));
        assert!(text.contains("gzip"));
        assert!(text.contains("css.line.break"));
        assert!(text.contains("use true or false"));
    }
}
