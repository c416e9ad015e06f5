//! Script linting.
//!
//! Syntax errors come from the oxc parser; style rules (line length,
//! trailing whitespace) are plain text checks. Rules are tuned through
//! `lint.option.<name>` keys:
//!
//! | Option    | Value | Default | Effect                                  |
//! |-----------|-------|---------|-----------------------------------------|
//! | `maxerr`  | int   | `50`    | stop reporting after this many findings |
//! | `maxlen`  | int   | (none)  | flag lines longer than this             |
//! | `white`   | bool  | `true`  | tolerate trailing whitespace            |
//! | `module`  | bool  | `false` | parse as an ES module, not a script     |

use std::path::Path;
use std::str::FromStr;

use oxc::allocator::Allocator;
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::config::parse_bool;

use super::{Diagnostic, Linter, TransformError, line_of, read_source};

const DEFAULT_MAX_ERRORS: usize = 50;

// ============================================================================
// options
// ============================================================================

/// A single validated lint option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintOption {
    MaxErr(usize),
    MaxLen(usize),
    White(bool),
    Module(bool),
}

impl LintOption {
    /// Parse `lint.option.<name> = <value>`.
    pub fn parse(name: &str, value: &str) -> Result<Self, String> {
        let int = |v: &str| {
            v.trim()
                .parse::<usize>()
                .map_err(|_| format!("`{name}` expects a non-negative integer, got `{v}`"))
        };
        let boolean =
            |v: &str| parse_bool(v).ok_or_else(|| format!("`{name}` expects a boolean, got `{v}`"));

        match name.to_ascii_lowercase().as_str() {
            "maxerr" => int(value).map(Self::MaxErr),
            "maxlen" => int(value).map(Self::MaxLen),
            "white" => boolean(value).map(Self::White),
            "module" => boolean(value).map(Self::Module),
            _ => Err(format!("unknown lint option `{name}`")),
        }
    }
}

/// Effective lint settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintOptions {
    pub max_errors: usize,
    pub max_len: Option<usize>,
    pub tolerate_whitespace: bool,
    pub module: bool,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            max_errors: DEFAULT_MAX_ERRORS,
            max_len: None,
            tolerate_whitespace: true,
            module: false,
        }
    }
}

impl LintOptions {
    /// Build from `(name, value)` pairs.
    ///
    /// Invalid entries are skipped and returned as warnings, never fatal.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> (Self, Vec<String>) {
        let mut options = Self::default();
        let mut warnings = Vec::new();

        for (name, value) in pairs {
            match LintOption::parse(name, value) {
                Ok(option) => options.apply(option),
                Err(msg) => warnings.push(msg),
            }
        }
        (options, warnings)
    }

    pub fn apply(&mut self, option: LintOption) {
        match option {
            LintOption::MaxErr(n) => self.max_errors = n,
            LintOption::MaxLen(n) => self.max_len = Some(n),
            LintOption::White(v) => self.tolerate_whitespace = v,
            LintOption::Module(v) => self.module = v,
        }
    }
}

impl FromStr for LintOption {
    type Err = String;

    /// Parse `name=value`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected `name=value`, got `{s}`"))?;
        Self::parse(name.trim(), value.trim())
    }
}

// ============================================================================
// linter
// ============================================================================

/// Script linter backed by the oxc parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct OxcLinter;

impl OxcLinter {
    /// Lint source text directly.
    pub fn check_source(&self, source: &str, options: &LintOptions) -> Vec<Diagnostic> {
        let mut found = syntax_errors(source, options.module);
        found.extend(style_findings(source, options));
        // stable: syntax errors stay ahead of style findings on the same line
        found.sort_by_key(|d| d.line);

        if found.len() > options.max_errors {
            found.truncate(options.max_errors);
            let line = found.last().map_or(1, |d| d.line);
            found.push(Diagnostic::new(line, "too many findings, stopping"));
        }
        found
    }
}

impl Linter for OxcLinter {
    fn check(&self, source: &Path, options: &LintOptions) -> Result<Vec<Diagnostic>, TransformError> {
        let text = read_source(source)?;
        Ok(self.check_source(&text, options))
    }
}

fn syntax_errors(source: &str, module: bool) -> Vec<Diagnostic> {
    let allocator = Allocator::default();
    let source_type = if module {
        SourceType::mjs()
    } else {
        SourceType::cjs()
    };
    let ret = Parser::new(&allocator, source, source_type).parse();

    ret.errors
        .iter()
        .map(|error| {
            let offset = error
                .labels
                .as_ref()
                .and_then(|labels| labels.first())
                .map_or(0, |label| label.offset());
            Diagnostic::new(line_of(source, offset), error.to_string())
        })
        .collect()
}

fn style_findings(source: &str, options: &LintOptions) -> Vec<Diagnostic> {
    let mut found = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        let line_no = idx + 1;

        if let Some(max) = options.max_len {
            let len = line.chars().count();
            if len > max {
                found.push(Diagnostic::new(
                    line_no,
                    format!("line is {len} characters long (max {max})"),
                ));
            }
        }

        if !options.tolerate_whitespace && line != line.trim_end() {
            found.push(Diagnostic::new(line_no, "trailing whitespace"));
        }
    }
    found
}
