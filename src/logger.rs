//! Terminal logging for bale.
//!
//! - `log!` prints a line with a colored `[module]` prefix
//! - `debug!` prints only at [`Verbosity::Verbose`]
//! - [`ProgressLine`] keeps one self-updating line of per-type counters
//!   (`[optimize] js(4/9) css(1/2)`) below the log output
//!
//! ```ignore
//! log!("bundle"; "{} from {} files", name, count);
//!
//! let progress = ProgressLine::new("optimize", &[(AssetType::Script, 9)]);
//! progress.inc(AssetType::Script);
//! progress.finish();
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering},
};

use crate::asset::AssetType;

/// How much the CLI prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Verbosity {
    /// Errors only
    Quiet = 0,
    Normal = 1,
    /// Adds `debug!` output
    Verbose = 2,
}

impl Verbosity {
    /// `--quiet` wins over `--verbose`.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, true) => Self::Verbose,
            (false, false) => Self::Normal,
        }
    }
}

static VERBOSITY: AtomicU8 = AtomicU8::new(Verbosity::Normal as u8);

/// Set while a [`ProgressLine`] owns the last terminal line.
static PROGRESS_ACTIVE: AtomicBool = AtomicBool::new(false);

pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

pub fn verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

pub fn is_verbose() -> bool {
    verbosity() == Verbosity::Verbose
}

pub fn is_quiet() -> bool {
    verbosity() == Verbosity::Quiet
}

// ============================================================================
// macros
// ============================================================================

/// `log!("module"; "format {}", args)`
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like `log!`, but only with `--verbose`.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// output
// ============================================================================

/// Print one prefixed line. Errors are printed even when quiet.
pub fn log(module: &str, message: &str) {
    let module = module.to_ascii_lowercase();
    if is_quiet() && module != "error" {
        return;
    }

    let mut out = stdout().lock();
    if PROGRESS_ACTIVE.load(Ordering::Relaxed) {
        // overwrite the progress line; the next `inc` redraws it below
        execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
    }
    writeln!(out, "{} {message}", prefix(&module)).ok();
    out.flush().ok();
}

fn prefix(module: &str) -> String {
    let tag = format!("[{module}]");
    match module {
        "scan" | "optimize" | "bundle" | "render" => tag.bright_blue().bold().to_string(),
        "done" | "manifest" => tag.bright_green().bold().to_string(),
        "lint" | "warn" | "prune" => tag.bright_magenta().bold().to_string(),
        "error" => tag.bright_red().bold().to_string(),
        _ => tag.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// progress
// ============================================================================

/// One line of per-type counters for a parallel stage.
///
/// Workers call [`inc`](Self::inc) concurrently; a redraw is skipped when
/// another worker is already drawing.
pub struct ProgressLine {
    stage: &'static str,
    counters: Vec<(AssetType, usize, AtomicUsize)>,
    draw: Mutex<()>,
}

impl ProgressLine {
    /// Types with nothing to do get no counter.
    pub fn new(stage: &'static str, totals: &[(AssetType, usize)]) -> Self {
        let counters = totals
            .iter()
            .filter(|(_, total)| *total > 0)
            .map(|&(kind, total)| (kind, total, AtomicUsize::new(0)))
            .collect();

        PROGRESS_ACTIVE.store(true, Ordering::Relaxed);
        let progress = Self {
            stage,
            counters,
            draw: Mutex::new(()),
        };
        progress.redraw(false);
        progress
    }

    pub fn inc(&self, kind: AssetType) {
        let Some((_, _, done)) = self.counters.iter().find(|(k, _, _)| *k == kind) else {
            return;
        };
        done.fetch_add(1, Ordering::Relaxed);
        if let Some(_guard) = self.draw.try_lock() {
            self.redraw(false);
        }
    }

    /// Leave the final counts on screen.
    pub fn finish(self) {
        PROGRESS_ACTIVE.store(false, Ordering::Relaxed);
        let _guard = self.draw.lock();
        self.redraw(true);
    }

    fn line(&self) -> String {
        self.counters
            .iter()
            .map(|(kind, total, done)| {
                format!("{}({}/{})", kind.extension(), done.load(Ordering::Relaxed), total)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn redraw(&self, newline: bool) {
        let mut out = stdout().lock();
        execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
        write!(out, "{} {}", prefix(self.stage), self.line()).ok();
        if newline {
            writeln!(out).ok();
        }
        out.flush().ok();
    }
}

impl Drop for ProgressLine {
    fn drop(&mut self) {
        if PROGRESS_ACTIVE.swap(false, Ordering::Relaxed) {
            let mut out = stdout().lock();
            execute!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine)).ok();
            out.flush().ok();
        }
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(true, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
    }

    #[test]
    fn test_progress_line_skips_empty_types() {
        let progress = ProgressLine::new(
            "optimize",
            &[(AssetType::Script, 3), (AssetType::Stylesheet, 0)],
        );
        assert_eq!(progress.counters.len(), 1);
        progress.inc(AssetType::Script);
        progress.inc(AssetType::Stylesheet);
        assert_eq!(progress.line(), "js(1/3)");
        progress.finish();
    }

    #[test]
    fn test_progress_line_counts_per_type() {
        let progress = ProgressLine::new(
            "optimize",
            &[(AssetType::Script, 2), (AssetType::Stylesheet, 1)],
        );
        progress.inc(AssetType::Script);
        progress.inc(AssetType::Stylesheet);
        progress.inc(AssetType::Script);
        assert_eq!(progress.line(), "js(2/2) css(1/1)");
        progress.finish();
    }

    #[test]
    fn test_prefix_wraps_module() {
        assert!(prefix("lint").contains("[lint]"));
        assert!(prefix("anything").contains("[anything]"));
    }
}
