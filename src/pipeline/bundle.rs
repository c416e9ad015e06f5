//! Group & bundle stage.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::asset::version::epoch_millis;
use crate::asset::{AssetGroup, GroupResolver, combine};
use crate::error::BuildError;
use crate::{debug, log};
use crate::utils::path::rel_slash;
use crate::utils::plural::plural_count;

use super::{BuildReport, BuiltBundle, Pipeline};

/// Bundle every non-empty group.
///
/// Membership for all groups is resolved before the first bundle is written,
/// so no bundle can end up inside another. Returns the failed groups.
pub(super) fn run(
    pipeline: &Pipeline<'_>,
    output_dir: &Path,
    report: &mut BuildReport,
) -> Vec<(String, BuildError)> {
    let resolver = GroupResolver::new(pipeline.config, pipeline.matcher.as_ref());
    let plans: Vec<(AssetGroup, Vec<PathBuf>)> = resolver
        .all_groups()
        .into_iter()
        .map(|group| {
            let members = resolver.membership(&group, output_dir);
            (group, members)
        })
        .collect();

    let mut failures = Vec::new();
    for (group, members) in plans {
        if members.is_empty() {
            report.record("bundle", format!("{}: no files, skipped", group.key()));
            report.skipped.push(group.key());
            continue;
        }

        for member in &members {
            let rel = rel_slash(member, output_dir).unwrap_or_else(|| member.display().to_string());
            debug!("bundle"; "{} <- {}", group.file_name(), rel);
        }

        match combine(&members, &group.bundle_path(output_dir), group.gzip) {
            Ok(artifact) => {
                let gz = if artifact.gzip_path.is_some() { " (+gzip)" } else { "" };
                report.record(
                    "bundle",
                    format!(
                        "{} from {}{}",
                        group.file_name(),
                        plural_count(members.len(), "file"),
                        gz
                    ),
                );
                debug!(
                    "bundle";
                    "{} version {}",
                    group.file_name(),
                    epoch_millis(artifact.last_modified)
                );
                report.bundles.push(BuiltBundle {
                    group,
                    members,
                    artifact,
                });
            }
            Err(e) => {
                log!("error"; "{}: {}", group.key(), e);
                failures.push((group.key(), e));
            }
        }
    }
    failures
}

/// Delete transformed files that belong to no bundle (`keep.non.grouped = false`),
/// then any directories left empty.
pub(super) fn prune_ungrouped(output_dir: &Path, report: &mut BuildReport) {
    let keep: FxHashSet<&Path> = report
        .bundles
        .iter()
        .flat_map(|b| b.members.iter().map(PathBuf::as_path))
        .collect();

    let stale: Vec<PathBuf> = report
        .outputs
        .iter()
        .filter(|path| !keep.contains(path.as_path()))
        .cloned()
        .collect();

    let mut removed = 0;
    for path in &stale {
        match fs::remove_file(path) {
            Ok(()) => {
                removed += 1;
                remove_empty_parents(path, output_dir);
            }
            Err(e) => log!("warn"; "cannot remove {}: {}", path.display(), e),
        }
    }

    report.outputs.retain(|path| !stale.contains(path));
    report.record("prune", format!("removed {}", plural_count(removed, "ungrouped file")));
}

/// Remove now-empty ancestors of `path`, stopping at `root`.
fn remove_empty_parents(path: &Path, root: &Path) {
    let mut dir = path.parent();
    while let Some(current) = dir {
        if current == root || !current.starts_with(root) {
            break;
        }
        // fails (and stops) on the first non-empty directory
        if fs::remove_dir(current).is_err() {
            break;
        }
        dir = current.parent();
    }
}
