//! Asset build pipeline.
//!
//! Runs one full build for a project:
//!
//! ```text
//! prepare output -> discover -> lint -> optimize/minify -> group & bundle -> manifest
//! ```
//!
//! Stages run strictly in order; each reads the filesystem output of the one
//! before. Work inside a stage (linting or transforming N files) runs on
//! rayon. Collaborators (path matcher, linter, optimizers) are trait objects
//! so tests can substitute them.

mod bundle;
mod lint;
mod manifest;
mod optimize;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::asset::version::epoch_millis;
use crate::asset::{AssetGroup, AssetType, BundleArtifact, SourceFile, scan_sources};
use crate::config::{AssetConfig, ConfigKey};
use crate::error::BuildError;
use crate::log;
use crate::matcher::{FsMatcher, PathMatcher};
use crate::transform::{CssMinifier, Linter, Optimizer, OxcLinter, OxcOptimizer};
use crate::utils::plural::plural_count;

// =============================================================================
// Types
// =============================================================================

/// A group that was bundled successfully.
#[derive(Debug, Clone)]
pub struct BuiltBundle {
    pub group: AssetGroup,
    /// Members in concatenation order
    pub members: Vec<PathBuf>,
    pub artifact: BundleArtifact,
}

/// What a build did, in order.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Human-readable log of actions
    pub actions: Vec<String>,
    pub discovered: usize,
    pub linted: usize,
    pub lint_warnings: usize,
    /// Transformed files written to the output directory
    pub outputs: Vec<PathBuf>,
    pub bundles: Vec<BuiltBundle>,
    /// Keys of groups with no members
    pub skipped: Vec<String>,
    pub manifest: Option<PathBuf>,
}

impl BuildReport {
    /// Log an action and keep it in the report.
    fn record(&mut self, module: &str, message: String) {
        log!(module; "{}", message);
        self.actions.push(message);
    }

    /// Cache-bust version of the most recently written bundle.
    pub fn latest_version(&self) -> Option<u128> {
        self.bundles
            .iter()
            .map(|b| epoch_millis(b.artifact.last_modified))
            .max()
    }
}

impl std::fmt::Display for BuildReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for action in &self.actions {
            writeln!(f, "{action}")?;
        }
        Ok(())
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// One configured build.
pub struct Pipeline<'a> {
    config: &'a AssetConfig,
    matcher: Box<dyn PathMatcher>,
    linter: Box<dyn Linter>,
    script_optimizer: Box<dyn Optimizer>,
    style_optimizer: Box<dyn Optimizer>,
}

impl<'a> Pipeline<'a> {
    /// Pipeline with the default collaborators, tuned by `config`.
    pub fn new(config: &'a AssetConfig) -> Self {
        let options = config.get_string(ConfigKey::JsOptimizeOptions.key(), "");
        let (script_optimizer, warnings) = OxcOptimizer::from_options(&options);
        for warning in warnings {
            log!("warn"; "{}: {}", ConfigKey::JsOptimizeOptions, warning);
        }
        let style_optimizer = CssMinifier::new(config.get_int(ConfigKey::CssLineBreak.key(), -1));

        Self {
            config,
            matcher: Box::new(FsMatcher::new()),
            linter: Box::new(OxcLinter),
            script_optimizer: Box::new(script_optimizer),
            style_optimizer: Box::new(style_optimizer),
        }
    }

    fn optimizer(&self, kind: AssetType) -> &dyn Optimizer {
        match kind {
            AssetType::Script => self.script_optimizer.as_ref(),
            AssetType::Stylesheet => self.style_optimizer.as_ref(),
        }
    }

    /// Run every stage.
    ///
    /// Bundle failures are isolated per group: the remaining groups and the
    /// manifest are still written, then all failures are returned together.
    pub fn run(&self) -> Result<BuildReport, BuildError> {
        let mut report = BuildReport::default();
        let web_root = self.config.web_root();
        let output_dir = self.config.output_dir();

        prepare_output(&output_dir, &web_root)?;
        report.record("build", format!("output directory {}", output_dir.display()));

        let sources = self.discover(&web_root, &output_dir, &mut report);

        lint::run(self, &sources, &web_root, &mut report)?;
        optimize::run(self, &sources, &output_dir, &mut report)?;

        let failures = bundle::run(self, &output_dir, &mut report);
        if !self.config.flag(ConfigKey::KeepNonGrouped) {
            bundle::prune_ungrouped(&output_dir, &mut report);
        }

        manifest::write(&self.config.manifest_path(), &output_dir, &mut report);

        if failures.is_empty() {
            report.record(
                "done",
                format!("{} written", plural_count(report.bundles.len(), "bundle")),
            );
            Ok(report)
        } else {
            Err(BuildError::Bundle(failures))
        }
    }

    fn discover(&self, web_root: &Path, output_dir: &Path, report: &mut BuildReport) -> Vec<SourceFile> {
        // Earlier output never becomes input when the output dir sits inside the web root
        let exclude = output_dir.starts_with(web_root).then_some(output_dir);

        let mut sources = Vec::new();
        for kind in AssetType::ALL {
            let found = scan_sources(kind, web_root, exclude, self.matcher.as_ref());
            report.record(
                "scan",
                format!(
                    "{} in {}",
                    plural_count(found.len(), &format!(".{} file", kind.extension())),
                    web_root.display()
                ),
            );
            sources.extend(found);
        }
        report.discovered = sources.len();
        sources
    }
}

/// Load the configuration for `root` and run a full build.
pub fn build_project(root: &Path, config_file: Option<&Path>) -> Result<BuildReport, BuildError> {
    let config = AssetConfig::load(root, config_file, &FsMatcher::new())?;
    Pipeline::new(&config).run()
}

/// Delete and recreate the output directory.
///
/// Refuses to run when that would delete the web root.
fn prepare_output(output_dir: &Path, web_root: &Path) -> Result<(), BuildError> {
    let fail = |source: io::Error| BuildError::PrepareOutput {
        path: output_dir.to_path_buf(),
        source,
    };

    if web_root.starts_with(output_dir) {
        return Err(fail(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("it contains the web root {}", web_root.display()),
        )));
    }

    match fs::remove_dir_all(output_dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(fail(e)),
    }
    fs::create_dir_all(output_dir).map_err(fail)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigValue;
    use crate::transform::{Diagnostic, LintOptions, TransformError};
    use std::fs;
    use tempfile::TempDir;

    const WEB: &str = "src/main/webapp";

    impl Pipeline<'_> {
        fn with_matcher(mut self, matcher: impl PathMatcher + 'static) -> Self {
            self.matcher = Box::new(matcher);
            self
        }

        fn with_linter(mut self, linter: impl Linter + 'static) -> Self {
            self.linter = Box::new(linter);
            self
        }
    }

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(WEB).join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        dir
    }

    fn config(dir: &TempDir, toml: &str) -> AssetConfig {
        AssetConfig::from_toml_str(dir.path(), toml).unwrap()
    }

    fn out(dir: &TempDir, rel: &str) -> PathBuf {
        dir.path().join("assets").join(rel)
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    fn bundle<'r>(report: &'r BuildReport, kind: AssetType, name: &str) -> &'r BuiltBundle {
        report
            .bundles
            .iter()
            .find(|b| b.group.kind == kind && b.group.name == name)
            .unwrap()
    }

    fn site() -> TempDir {
        project(&[
            ("lib/a.js", "var alpha = function (value) { return value + 1; };\n"),
            ("lib/b.js", "var beta = function (value) { return value * 2; };\n"),
            ("app/main.js", "alpha(beta(2));\n"),
            ("css/site.css", "body {\n  margin: 0px;\n}\n"),
            ("css/print.css", "body {\n  color: #000000;\n}\n"),
        ])
    }

    #[test]
    fn test_vendor_group_and_default_style_group() {
        let dir = site();
        let config = config(&dir, r#""js.asset.vendor" = ["lib/*.js"]"#);

        let report = Pipeline::new(&config).run().unwrap();
        assert_eq!(report.discovered, 5);
        assert_eq!(report.bundles.len(), 2);

        // vendor.js is a.js then b.js, each as transformed
        let vendor = read(&out(&dir, "vendor.js"));
        let expected = read(&out(&dir, "lib/a.js")) + &read(&out(&dir, "lib/b.js"));
        assert_eq!(vendor, expected);
        assert!(!vendor.contains("alpha(beta"));
        assert!(out(&dir, "vendor.js.gz").exists());

        // no js.asset key for a default script group
        assert!(!out(&dir, "script.js").exists());

        // default style group holds every stylesheet
        let style = bundle(&report, AssetType::Stylesheet, "style");
        assert_eq!(
            style.members,
            vec![out(&dir, "css/print.css"), out(&dir, "css/site.css")]
        );
        assert_eq!(read(&out(&dir, "style.css")), "body{color:#000}body{margin:0}");

        // manifest
        assert_eq!(
            read(&out(&dir, "manifest.txt")),
            "js.asset.vendor = lib/a.js\n\
             js.asset.vendor = lib/b.js\n\
             css.asset.style = css/print.css\n\
             css.asset.style = css/site.css\n"
        );
        assert_eq!(report.manifest, Some(out(&dir, "manifest.txt")));
    }

    #[test]
    fn test_zero_config_builds_default_groups() {
        let dir = site();
        let config = AssetConfig::empty(dir.path());

        let report = Pipeline::new(&config).run().unwrap();
        let script = bundle(&report, AssetType::Script, "script");
        assert_eq!(script.members.len(), 3);
        assert!(out(&dir, "script.js").exists());
        assert!(out(&dir, "style.css").exists());

        let log = report.to_string();
        assert!(log.contains("3 .js files in"), "{log}");
        assert!(log.contains("script.js from 3 files (+gzip)"), "{log}");

        let newest = report
            .bundles
            .iter()
            .map(|b| epoch_millis(fs::metadata(&b.artifact.path).unwrap().modified().unwrap()))
            .max();
        assert_eq!(report.latest_version(), newest);
        assert!(AssetConfig::empty(dir.path()).output_dir().join("style.css.gz").exists());
    }

    #[test]
    fn test_lint_failure_aborts_before_optimize() {
        let dir = site();
        let config = config(
            &dir,
            r#"
            lint.failonwarning = true
            lint.option.maxlen = 40
            "#,
        );

        let err = Pipeline::new(&config).run().unwrap_err();
        assert!(matches!(err, BuildError::Lint { files: 2, .. }), "{err}");

        // prepared but empty output directory
        let output = dir.path().join("assets");
        assert!(output.is_dir());
        assert_eq!(fs::read_dir(&output).unwrap().count(), 0);
    }

    #[test]
    fn test_lint_warnings_do_not_fail_by_default() {
        let dir = site();
        let config = config(&dir, "lint.option.maxlen = 40");

        let report = Pipeline::new(&config).run().unwrap();
        assert_eq!(report.linted, 3);
        assert_eq!(report.lint_warnings, 2);
        assert!(out(&dir, "script.js").exists());
    }

    #[test]
    fn test_lint_skip_and_exclude() {
        struct AlwaysWarn;
        impl Linter for AlwaysWarn {
            fn check(&self, _: &Path, _: &LintOptions) -> Result<Vec<Diagnostic>, TransformError> {
                Ok(vec![Diagnostic::new(1, "nope")])
            }
        }

        let dir = site();
        let config = config(&dir, "lint.failonwarning = true\nlint.skip = true");
        Pipeline::new(&config).with_linter(AlwaysWarn).run().unwrap();

        let config = config_with_exclude(&dir);
        let report = Pipeline::new(&config).with_linter(AlwaysWarn).run().unwrap();
        assert_eq!(report.linted, 0);
    }

    fn config_with_exclude(dir: &TempDir) -> AssetConfig {
        AssetConfig::empty(dir.path())
            .with("lint.failonwarning", ConfigValue::Scalar("true".into()))
            .with(
                "lint.exclude",
                ConfigValue::List(vec!["lib/**".into(), "app/*.js".into()]),
            )
    }

    #[test]
    fn test_transform_failure_is_fatal() {
        let dir = project(&[("ok.js", "var a = 1;"), ("broken.js", "function (")]);
        let config = config(&dir, "lint.skip = true");

        let err = Pipeline::new(&config).run().unwrap_err();
        assert!(matches!(err, BuildError::Transform(TransformError::Parse { .. })), "{err}");
        assert!(!out(&dir, "script.js").exists());
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let dir = site();
        let config = config(&dir, r#""js.asset.vendor" = ["lib/*.js", "app/*.js"]"#);

        Pipeline::new(&config).run().unwrap();
        let first = fs::read(out(&dir, "vendor.js")).unwrap();
        let first_css = fs::read(out(&dir, "style.css")).unwrap();

        Pipeline::new(&config).run().unwrap();
        assert_eq!(fs::read(out(&dir, "vendor.js")).unwrap(), first);
        assert_eq!(fs::read(out(&dir, "style.css")).unwrap(), first_css);
    }

    #[test]
    fn test_stale_output_is_removed() {
        let dir = site();
        fs::create_dir_all(dir.path().join("assets/old")).unwrap();
        fs::write(dir.path().join("assets/old/stale.js"), "stale").unwrap();

        let config = AssetConfig::empty(dir.path());
        let report = Pipeline::new(&config).run().unwrap();
        assert!(!out(&dir, "old").exists());
        let script = bundle(&report, AssetType::Script, "script");
        assert!(!read(&out(&dir, "script.js")).contains("stale"));
        assert_eq!(script.members.len(), 3);
    }

    #[test]
    fn test_prune_non_grouped() {
        let dir = site();
        let config = config(
            &dir,
            r#"
            keep.non.grouped = false
            "js.asset.vendor" = ["lib/*.js"]
            "#,
        );

        Pipeline::new(&config).run().unwrap();
        assert!(out(&dir, "lib/a.js").exists());
        assert!(!out(&dir, "app/main.js").exists());
        assert!(!out(&dir, "app").exists());
        assert!(out(&dir, "vendor.js").exists());
        assert!(out(&dir, "manifest.txt").exists());
    }

    #[test]
    fn test_bundle_failures_are_isolated() {
        /// Matcher that reports a file nobody wrote for the `ghost` pattern.
        struct GhostMatcher(FsMatcher);
        impl PathMatcher for GhostMatcher {
            fn find(&self, pattern: &str, base: &Path) -> Vec<PathBuf> {
                if pattern == "ghost/*.js" {
                    return vec![base.join("ghost/missing.js")];
                }
                self.0.find(pattern, base)
            }
        }

        let dir = site();
        let config = config(
            &dir,
            r#"
            "js.asset.ghost" = ["ghost/*.js"]
            "js.asset.vendor" = ["lib/*.js"]
            "#,
        );

        let err = Pipeline::new(&config)
            .with_matcher(GhostMatcher(FsMatcher::new()))
            .run()
            .unwrap_err();

        let BuildError::Bundle(failures) = err else {
            panic!("expected bundle failure, got {err}");
        };
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "js.asset.ghost");
        assert!(!out(&dir, "ghost.js").exists());
        assert!(!out(&dir, "ghost.js.gz").exists());
        assert!(out(&dir, "vendor.js").exists());
        assert!(out(&dir, "style.css").exists());
        assert!(read(&out(&dir, "manifest.txt")).contains("js.asset.vendor = lib/a.js"));
    }

    #[test]
    fn test_empty_group_is_skipped() {
        let dir = site();
        let config = config(&dir, r#""css.asset.print" = ["print/*.css"]"#);

        let report = Pipeline::new(&config).run().unwrap();
        assert_eq!(report.skipped, vec!["css.asset.print"]);
        assert!(!out(&dir, "print.css").exists());
    }

    #[test]
    fn test_preminified_copied_verbatim() {
        let dir = project(&[
            ("lib/jquery.min.js", "!function(){ /* keep me */ }();"),
            ("app.js", "var a = 1;"),
        ]);
        let config = AssetConfig::empty(dir.path());

        Pipeline::new(&config).run().unwrap();
        assert_eq!(
            read(&out(&dir, "lib/jquery.min.js")),
            "!function(){ /* keep me */ }();"
        );
    }

    #[test]
    fn test_gzip_disabled_per_group() {
        let dir = site();
        let config = config(
            &dir,
            r#"
            [js.asset.vendor]
            include = ["lib/*.js"]
            gzip = false
            "#,
        );

        Pipeline::new(&config).run().unwrap();
        assert!(out(&dir, "vendor.js").exists());
        assert!(!out(&dir, "vendor.js.gz").exists());
        assert!(out(&dir, "style.css.gz").exists());
    }

    #[test]
    fn test_css_cache_bust() {
        let dir = project(&[("site.css", "body { background: url(img/bg.png) }")]);
        let config = config(&dir, "css.cache.bust = true");

        Pipeline::new(&config).run().unwrap();
        let css = read(&out(&dir, "site.css"));
        assert!(css.contains("img/bg.png?"), "{css}");
    }

    #[test]
    fn test_output_dir_containing_web_root_is_rejected() {
        let dir = site();
        let config = config(&dir, r#"output.dir = "src""#);

        let err = Pipeline::new(&config).run().unwrap_err();
        assert!(matches!(err, BuildError::PrepareOutput { .. }));
        assert!(dir.path().join(WEB).join("lib/a.js").exists());
    }

    #[test]
    fn test_build_project_without_config_file() {
        let dir = site();
        let report = build_project(dir.path(), None).unwrap();
        assert_eq!(report.bundles.len(), 2);

        let err = build_project(dir.path(), Some(Path::new("missing.toml"))).unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
    }
}
