//! Known configuration keys.

/// Configuration keys understood by the pipeline and the resolver.
///
/// Prefix keys (`LintOptionPrefix`, `JsAssetPrefix`, `CssAssetPrefix`) name a
/// namespace: every key below them (`js.asset.vendor`) is read by iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    WebRoot,
    WebRootUrl,
    OutputDir,
    OutputUrl,
    ManifestFile,
    Gzip,
    KeepNonGrouped,
    LintSkip,
    LintFailOnWarning,
    LintExclude,
    LintOptionPrefix,
    JsOptimizeOptions,
    CssLineBreak,
    CssCacheBust,
    JsAssetPrefix,
    CssAssetPrefix,
    Environment,
}

impl ConfigKey {
    /// Boolean keys, validated at load time.
    pub const BOOLS: [ConfigKey; 5] = [
        ConfigKey::Gzip,
        ConfigKey::KeepNonGrouped,
        ConfigKey::LintSkip,
        ConfigKey::LintFailOnWarning,
        ConfigKey::CssCacheBust,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::WebRoot => "webroot",
            Self::WebRootUrl => "webroot.url",
            Self::OutputDir => "output.dir",
            Self::OutputUrl => "output.url",
            Self::ManifestFile => "manifest.file",
            Self::Gzip => "gzip",
            Self::KeepNonGrouped => "keep.non.grouped",
            Self::LintSkip => "lint.skip",
            Self::LintFailOnWarning => "lint.failonwarning",
            Self::LintExclude => "lint.exclude",
            Self::LintOptionPrefix => "lint.option",
            Self::JsOptimizeOptions => "js.optimize.options",
            Self::CssLineBreak => "css.line.break",
            Self::CssCacheBust => "css.cache.bust",
            Self::JsAssetPrefix => "js.asset",
            Self::CssAssetPrefix => "css.asset",
            Self::Environment => "environment",
        }
    }

    /// Default for boolean keys.
    pub const fn default_bool(self) -> bool {
        match self {
            Self::Gzip | Self::KeepNonGrouped => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Default web root, relative to the project root.
pub const DEFAULT_WEB_ROOT: &str = "src/main/webapp";

/// Default output directory, relative to the project root.
pub const DEFAULT_OUTPUT_DIR: &str = "assets";

/// Default manifest file name inside the output directory.
pub const DEFAULT_MANIFEST_FILE: &str = "manifest.txt";

/// Value of `environment` selecting development-mode resolution.
pub const DEVELOPMENT: &str = "development";
