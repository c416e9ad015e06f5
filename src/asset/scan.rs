//! Source discovery (pure, no side effects).

use std::path::{Path, PathBuf};

use crate::matcher::PathMatcher;
use crate::utils::path::rel_slash;

use super::AssetType;

/// A script or stylesheet found under the web root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path of the source
    pub path: PathBuf,
    pub kind: AssetType,
    /// Path relative to the web root, `/`-separated
    pub rel: String,
}

impl SourceFile {
    /// Where the transformed copy of this file lives.
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.rel)
    }
}

/// Scan the web root for every file of the given type
///
/// Files inside `exclude_dir` (the output directory, when it sits under the
/// web root) are skipped so earlier build output never becomes input.
///
/// # Pure Function
///
/// This function only reads the filesystem and returns data
pub fn scan_sources(
    kind: AssetType,
    web_root: &Path,
    exclude_dir: Option<&Path>,
    matcher: &dyn PathMatcher,
) -> Vec<SourceFile> {
    matcher
        .find(&kind.all_pattern(), web_root)
        .into_iter()
        .filter(|path| exclude_dir.is_none_or(|dir| !path.starts_with(dir)))
        .filter_map(|path| {
            let rel = rel_slash(&path, web_root)?;
            Some(SourceFile { path, kind, rel })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::FsMatcher;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_sources_by_type() {
        let dir = TempDir::new().unwrap();
        let web = dir.path().join("web");
        fs::create_dir_all(web.join("lib")).unwrap();
        fs::write(web.join("lib/a.js"), "var a;").unwrap();
        fs::write(web.join("app.js"), "var b;").unwrap();
        fs::write(web.join("site.css"), "body{}").unwrap();

        let scripts = scan_sources(AssetType::Script, &web, None, &FsMatcher::new());
        let rels: Vec<_> = scripts.iter().map(|s| s.rel.as_str()).collect();
        assert_eq!(rels, vec!["app.js", "lib/a.js"]);
        assert!(scripts.iter().all(|s| s.kind == AssetType::Script));

        let styles = scan_sources(AssetType::Stylesheet, &web, None, &FsMatcher::new());
        assert_eq!(styles.len(), 1);
        assert_eq!(styles[0].output_path(Path::new("/out")), PathBuf::from("/out/site.css"));
    }

    #[test]
    fn test_scan_sources_skips_output_dir() {
        let dir = TempDir::new().unwrap();
        let web = dir.path().join("web");
        fs::create_dir_all(web.join("assets")).unwrap();
        fs::write(web.join("app.js"), "var b;").unwrap();
        fs::write(web.join("assets/script.js"), "bundle").unwrap();

        let scripts = scan_sources(
            AssetType::Script,
            &web,
            Some(&web.join("assets")),
            &FsMatcher::new(),
        );
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].rel, "app.js");
    }

    #[test]
    fn test_scan_missing_web_root() {
        let dir = TempDir::new().unwrap();
        let scripts = scan_sources(
            AssetType::Script,
            &dir.path().join("missing"),
            None,
            &FsMatcher::new(),
        );
        assert!(scripts.is_empty());
    }
}
