//! Lint stage.

use std::path::Path;

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::asset::{AssetType, SourceFile};
use crate::config::ConfigKey;
use crate::error::BuildError;
use crate::log;
use crate::transform::LintOptions;
use crate::utils::plural::plural_count;

use super::{BuildReport, Pipeline};

/// Lint every script that isn't excluded or already minified.
///
/// Findings are logged; with `lint.failonwarning` any finding fails the build.
pub(super) fn run(
    pipeline: &Pipeline<'_>,
    sources: &[SourceFile],
    web_root: &Path,
    report: &mut BuildReport,
) -> Result<(), BuildError> {
    let config = pipeline.config;
    if config.flag(ConfigKey::LintSkip) {
        report.record("lint", "skipped".to_string());
        return Ok(());
    }

    let pairs = config
        .subset(ConfigKey::LintOptionPrefix.key())
        .filter(|(name, _)| !name.is_empty())
        .filter_map(|(name, value)| Some((name, value.as_str()?)));
    let (options, warnings) = LintOptions::from_pairs(pairs);
    for warning in warnings {
        log!("warn"; "{}: {}", ConfigKey::LintOptionPrefix, warning);
    }

    let excluded: FxHashSet<_> = config
        .get_list(ConfigKey::LintExclude.key())
        .iter()
        .flat_map(|pattern| pipeline.matcher.find(pattern, web_root))
        .collect();

    let targets: Vec<&SourceFile> = sources
        .iter()
        .filter(|s| s.kind == AssetType::Script)
        .filter(|s| !AssetType::is_preminified(&s.path) && !excluded.contains(&s.path))
        .collect();

    // Parallel check, ordered results
    let results: Vec<_> = targets
        .par_iter()
        .map(|source| pipeline.linter.check(&source.path, &options))
        .collect();

    let mut warned_files = 0;
    for (source, result) in targets.iter().zip(results) {
        let diagnostics = result?;
        if diagnostics.is_empty() {
            continue;
        }
        warned_files += 1;
        report.lint_warnings += diagnostics.len();
        for diagnostic in &diagnostics {
            log!("lint"; "{}:{}: {}", source.rel, diagnostic.line, diagnostic.message);
        }
    }
    report.linted = targets.len();

    if warned_files == 0 {
        report.record("lint", format!("{} clean", plural_count(targets.len(), "file")));
        return Ok(());
    }

    report.record(
        "lint",
        format!(
            "{} in {}",
            plural_count(report.lint_warnings, "warning"),
            plural_count(warned_files, "file")
        ),
    );
    if config.flag(ConfigKey::LintFailOnWarning) {
        return Err(BuildError::Lint {
            warnings: report.lint_warnings,
            files: warned_files,
        });
    }
    Ok(())
}
