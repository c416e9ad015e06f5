//! Manifest stage.
//!
//! One line per bundled member, in bundle then member order:
//!
//! ```text
//! js.asset.vendor = lib/a.js
//! js.asset.vendor = lib/b.js
//! css.asset.style = css/site.css
//! ```

use std::fs;
use std::path::Path;

use crate::log;
use crate::utils::path::rel_slash;

use super::{BuildReport, BuiltBundle};

/// Render the manifest text.
pub(super) fn render(bundles: &[BuiltBundle], output_dir: &Path) -> String {
    let mut out = String::new();
    for bundle in bundles {
        let key = bundle.group.key();
        for member in &bundle.members {
            let rel = rel_slash(member, output_dir).unwrap_or_else(|| member.display().to_string());
            out.push_str(&format!("{key} = {rel}\n"));
        }
    }
    out
}

/// Write the manifest. Failure is logged, never fatal.
pub(super) fn write(path: &Path, output_dir: &Path, report: &mut BuildReport) {
    let content = render(&report.bundles, output_dir);
    let result = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| fs::write(path, content));

    match result {
        Ok(()) => {
            report.record("manifest", format!("wrote {}", path.display()));
            report.manifest = Some(path.to_path_buf());
        }
        Err(e) => log!("error"; "couldn't write manifest {}: {}", path.display(), e),
    }
}
