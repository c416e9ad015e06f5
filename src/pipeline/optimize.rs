//! Optimize/minify stage.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::asset::{AssetType, GroupResolver, SourceFile};
use crate::config::ConfigKey;
use crate::error::BuildError;
use crate::log;
use crate::logger::{ProgressLine, is_quiet};
use crate::transform::{TransformError, copy_verbatim};
use crate::utils::css::bust_file;
use crate::utils::plural::plural_count;

use super::{BuildReport, Pipeline};

/// Transform every source into the output directory, mirroring its path.
///
/// The first failure aborts the stage; files already in flight finish but
/// nothing new starts.
pub(super) fn run(
    pipeline: &Pipeline<'_>,
    sources: &[SourceFile],
    output_dir: &Path,
    report: &mut BuildReport,
) -> Result<(), BuildError> {
    warn_bundle_collisions(pipeline, sources, output_dir);

    let count = |kind: AssetType| sources.iter().filter(|s| s.kind == kind).count();
    let progress = (!is_quiet()).then(|| {
        ProgressLine::new(
            "optimize",
            &[
                (AssetType::Script, count(AssetType::Script)),
                (AssetType::Stylesheet, count(AssetType::Stylesheet)),
            ],
        )
    });

    let has_error = AtomicBool::new(false);
    let first_error: Mutex<Option<TransformError>> = Mutex::new(None);

    sources.par_iter().for_each(|source| {
        if has_error.load(Ordering::Relaxed) {
            return;
        }
        if let Err(e) = transform_one(pipeline, source, output_dir) {
            if !has_error.swap(true, Ordering::Relaxed) {
                *first_error.lock() = Some(e);
            }
            return;
        }
        if let Some(p) = &progress {
            p.inc(source.kind);
        }
    });

    if let Some(p) = progress {
        p.finish();
    }
    if let Some(e) = first_error.into_inner() {
        log!("error"; "{}", e);
        return Err(e.into());
    }

    report.outputs = sources.iter().map(|s| s.output_path(output_dir)).collect();
    report.record(
        "optimize",
        format!("{} transformed", plural_count(sources.len(), "file")),
    );

    if pipeline.config.flag(ConfigKey::CssCacheBust) {
        bust_stylesheets(sources, output_dir, report)?;
    }
    Ok(())
}

fn transform_one(
    pipeline: &Pipeline<'_>,
    source: &SourceFile,
    output_dir: &Path,
) -> Result<(), TransformError> {
    let dest = source.output_path(output_dir);
    if AssetType::is_preminified(&source.path) {
        return copy_verbatim(&source.path, &dest);
    }
    pipeline.optimizer(source.kind).transform(&source.path, &dest)
}

/// Append `?<mtime>` to `url(...)` references in transformed stylesheets.
fn bust_stylesheets(
    sources: &[SourceFile],
    output_dir: &Path,
    report: &mut BuildReport,
) -> Result<(), BuildError> {
    let mut busted = 0;
    for source in sources.iter().filter(|s| s.kind == AssetType::Stylesheet) {
        let path = source.output_path(output_dir);
        if bust_file(&path).map_err(|e| BuildError::io(&path, e))? {
            busted += 1;
        }
    }
    report.record(
        "optimize",
        format!("cache-busted urls in {}", plural_count(busted, "stylesheet")),
    );
    Ok(())
}

/// A transformed file at a bundle's path would be replaced by the bundle.
fn warn_bundle_collisions(pipeline: &Pipeline<'_>, sources: &[SourceFile], output_dir: &Path) {
    let bundles: FxHashSet<_> = GroupResolver::new(pipeline.config, pipeline.matcher.as_ref())
        .all_groups()
        .iter()
        .map(|g| g.bundle_path(output_dir))
        .collect();

    for source in sources {
        if bundles.contains(&source.output_path(output_dir)) {
            log!("warn"; "{} shares its path with a bundle and won't be a group member", source.rel);
        }
    }
}
