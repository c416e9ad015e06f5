//! Minification for JS and CSS files.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. Files already named
//! `*.min.js` / `*-min.css` are copied as-is.

use std::path::Path;

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::{Optimizer, TransformError, read_source, write_output};

/// Copy a file unchanged, creating parent directories.
pub fn copy_verbatim(source: &Path, dest: &Path) -> Result<(), TransformError> {
    let bytes = std::fs::read(source).map_err(|e| TransformError::read(source, e))?;
    write_output(dest, &bytes)
}

// ============================================================================
// JavaScript
// ============================================================================

/// JavaScript optimizer.
///
/// Flags from `js.optimize.options`: `--no-mangle`, `--no-compress`,
/// `--module`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OxcOptimizer {
    pub mangle: bool,
    pub compress: bool,
    pub module: bool,
}

impl Default for OxcOptimizer {
    fn default() -> Self {
        Self {
            mangle: true,
            compress: true,
            module: false,
        }
    }
}

impl OxcOptimizer {
    /// Parse a whitespace separated flag string.
    ///
    /// Unknown flags are returned as warnings and otherwise ignored.
    pub fn from_options(options: &str) -> (Self, Vec<String>) {
        let mut optimizer = Self::default();
        let mut warnings = Vec::new();
        for flag in options.split_whitespace() {
            match flag {
                "--no-mangle" => optimizer.mangle = false,
                "--no-compress" => optimizer.compress = false,
                "--module" => optimizer.module = true,
                other => warnings.push(format!("unknown optimize option `{other}`")),
            }
        }
        (optimizer, warnings)
    }

    /// Minify JavaScript source code.
    pub fn minify(&self, source: &str) -> Result<String, String> {
        let allocator = Allocator::default();
        let source_type = if self.module {
            SourceType::mjs()
        } else {
            SourceType::cjs()
        };
        let ret = Parser::new(&allocator, source, source_type).parse();
        if let Some(error) = ret.errors.first() {
            return Err(error.to_string());
        }
        let mut program = ret.program;
        let options = MinifierOptions {
            mangle: self.mangle.then(MangleOptions::default),
            compress: self.compress.then(CompressOptions::smallest),
        };
        let ret = Minifier::new(options).minify(&allocator, &mut program);
        let code = Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                ..CodegenOptions::default()
            })
            .with_scoping(ret.scoping)
            .build(&program)
            .code;
        Ok(code)
    }
}

impl Optimizer for OxcOptimizer {
    fn transform(&self, source: &Path, dest: &Path) -> Result<(), TransformError> {
        let text = read_source(source)?;
        let code = self.minify(&text).map_err(|message| TransformError::Parse {
            path: source.to_path_buf(),
            message,
        })?;
        write_output(dest, code.as_bytes())
    }
}

// ============================================================================
// CSS
// ============================================================================

/// CSS minifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CssMinifier {
    /// Break the line after a rule once it reaches this many characters
    pub line_break: Option<usize>,
}

impl CssMinifier {
    /// From `css.line.break`; negative disables line breaking.
    pub fn new(line_break: i64) -> Self {
        Self {
            line_break: usize::try_from(line_break).ok(),
        }
    }

    /// Minify CSS source code.
    pub fn minify(&self, source: &str) -> Result<String, String> {
        let stylesheet =
            StyleSheet::parse(source, ParserOptions::default()).map_err(|e| e.to_string())?;
        let result = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .map_err(|e| e.to_string())?;

        Ok(match self.line_break {
            Some(width) => break_lines(&result.code, width),
            None => result.code,
        })
    }
}

impl Optimizer for CssMinifier {
    fn transform(&self, source: &Path, dest: &Path) -> Result<(), TransformError> {
        let text = read_source(source)?;
        let code = self.minify(&text).map_err(|message| TransformError::Parse {
            path: source.to_path_buf(),
            message,
        })?;
        write_output(dest, code.as_bytes())
    }
}

/// Insert a newline after a closing brace once the line is `width` long.
fn break_lines(css: &str, width: usize) -> String {
    let mut out = String::with_capacity(css.len() + css.len() / width.max(1));
    let mut line_len = 0;
    for c in css.chars() {
        out.push(c);
        line_len += 1;
        if c == '}' && line_len >= width {
            out.push('\n');
            line_len = 0;
        }
    }
    if out.ends_with('\n') {
        out.pop();
    }
    out
}
