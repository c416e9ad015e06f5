//! `bale build`: run the full asset pipeline.
//!
//! Phases:
//! - **Configure** - Locate `bale.toml` / `bale.properties` (or use defaults)
//! - **Prepare** - Recreate the output directory
//! - **Lint** - Check scripts (unless `lint.skip`)
//! - **Optimize** - Minify every script and stylesheet in parallel
//! - **Bundle** - Concatenate each group, gzip siblings
//! - **Manifest** - Record group membership

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::log;
use crate::pipeline::build_project;

/// Build the project at `root`.
pub fn build_assets(root: &Path, config_file: Option<&Path>) -> Result<()> {
    let start = Instant::now();

    let report = build_project(root, config_file).context("build failed")?;

    if report.manifest.is_none() {
        log!("warn"; "bundles were built but no manifest was written");
    }
    if let Some(version) = report.latest_version() {
        log!("done"; "bundle version {}", version);
    }
    log!(
        "build";
        "{} sources, {} linted ({} warnings), {} bundled, {} empty ({:.2?})",
        report.discovered,
        report.linted,
        report.lint_warnings,
        report.bundles.len(),
        report.skipped.len(),
        start.elapsed()
    );
    Ok(())
}
