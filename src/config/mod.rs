//! Asset pipeline configuration (`bale.toml` / `bale.properties`).
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   ├── key        # ConfigKey and defaults
//! │   └── value      # ConfigValue
//! ├── util           # File lookup, TOML flattening, properties reader
//! └── mod.rs         # AssetConfig (this file)
//! ```
//!
//! Every file format is flattened into one ordered list of dotted keys, so
//! the rest of the crate only ever asks questions like "what is `gzip`" or
//! "which keys live under `js.asset`".
//!
//! | Key                     | Type   | Default            |
//! |-------------------------|--------|--------------------|
//! | `webroot`               | path   | `src/main/webapp`  |
//! | `webroot.url`           | url    | (empty)            |
//! | `output.dir`            | path   | `assets`           |
//! | `output.url`            | url    | `/<output.dir>`    |
//! | `manifest.file`         | path   | `manifest.txt`     |
//! | `gzip`                  | bool   | `true`             |
//! | `keep.non.grouped`      | bool   | `true`             |
//! | `lint.skip`             | bool   | `false`            |
//! | `lint.failonwarning`    | bool   | `false`            |
//! | `lint.exclude`          | list   | (empty)            |
//! | `lint.option.<name>`    | string | -                  |
//! | `js.optimize.options`   | string | (empty)            |
//! | `css.line.break`        | int    | `-1`               |
//! | `css.cache.bust`        | bool   | `false`            |
//! | `js.asset.<group>`      | list   | default group      |
//! | `css.asset.<group>`     | list   | default group      |
//! | `environment`           | string | (empty)            |

pub mod types;
mod util;

pub use types::{
    ConfigDiagnostics, ConfigError, ConfigKey, ConfigValue, DEFAULT_MANIFEST_FILE,
    DEFAULT_OUTPUT_DIR, DEFAULT_WEB_ROOT, DEVELOPMENT, parse_bool,
};
use util::find_config_file;

use std::fs;
use std::path::{Path, PathBuf};

use crate::matcher::PathMatcher;
use crate::utils::path::resolve_path;
use crate::{debug, log};

// ============================================================================
// root configuration
// ============================================================================

/// Immutable key/value configuration for one project.
///
/// Constructed once and passed explicitly to the pipeline and the resolver.
#[derive(Debug, Clone, Default)]
pub struct AssetConfig {
    /// Project root; relative paths resolve against it
    root: PathBuf,

    /// Config file this was loaded from, if any
    source: Option<PathBuf>,

    /// Flattened entries in file order (keys are unique)
    entries: Vec<(String, ConfigValue)>,
}

impl AssetConfig {
    /// Empty configuration: every lookup falls back to its default.
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            source: None,
            entries: Vec::new(),
        }
    }

    /// Locate and load the configuration for a project.
    ///
    /// An explicit path must exist. Without one, the root (and then the
    /// tree below it) is searched; finding nothing yields an empty config.
    pub fn load(
        root: &Path,
        explicit: Option<&Path>,
        matcher: &dyn PathMatcher,
    ) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    root.join(path)
                };
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path));
                }
                Some(path)
            }
            None => find_config_file(root, matcher),
        };

        match path {
            Some(path) => {
                log!("config"; "using {}", path.display());
                Self::from_path(root, &path)
            }
            None => {
                debug!("config"; "no config file found, using defaults");
                Ok(Self::empty(root))
            }
        }
    }

    /// Load from a file, choosing the reader by extension.
    pub fn from_path(root: &Path, path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        let is_properties = path.extension().is_some_and(|ext| ext == "properties");
        let mut config = if is_properties {
            Self::parse_properties(root, &content).map_err(|(line, message)| {
                ConfigError::Properties {
                    path: path.to_path_buf(),
                    line,
                    message,
                }
            })?
        } else {
            Self::parse_toml(root, &content).map_err(|e| match e {
                TomlFailure::Syntax(e) => ConfigError::Toml(path.to_path_buf(), e),
                TomlFailure::Shape(err) => err,
            })?
        };
        config.source = Some(path.to_path_buf());
        config.validate()?;
        Ok(config)
    }

    #[cfg(test)]
    pub fn from_toml_str(root: impl Into<PathBuf>, content: &str) -> Result<Self, ConfigError> {
        let config = Self::parse_toml(root.into().as_path(), content).map_err(|e| match e {
            TomlFailure::Syntax(e) => ConfigError::Toml(PathBuf::from("<inline>"), e),
            TomlFailure::Shape(err) => err,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn parse_toml(root: &Path, content: &str) -> Result<Self, TomlFailure> {
        let table: toml::Table = toml::from_str(content).map_err(TomlFailure::Syntax)?;
        let mut entries = Vec::new();
        util::flatten_toml("", &table, &mut entries).map_err(|key| {
            let mut diag = ConfigDiagnostics::new();
            diag.push(key, "lists may only hold plain values")
                .hint("write patterns as `key = [\"a/*.js\", \"b/*.js\"]`");
            TomlFailure::Shape(ConfigError::Invalid(diag))
        })?;
        Ok(Self {
            root: root.to_path_buf(),
            source: None,
            entries,
        })
    }

    fn parse_properties(root: &Path, content: &str) -> Result<Self, (usize, String)> {
        let mut entries = Vec::new();
        util::parse_properties(content, &mut entries)?;
        Ok(Self {
            root: root.to_path_buf(),
            source: None,
            entries,
        })
    }

    /// Return a copy with `key` set (replacing any previous value).
    #[cfg(test)]
    pub fn with(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Check typed keys, collecting every problem before failing.
    fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        for (key, value) in &self.entries {
            let is_bool = ConfigKey::BOOLS.iter().any(|k| k.key() == key)
                || self.is_group_attr(key, "gzip");
            if is_bool && value.as_str().and_then(parse_bool).is_none() {
                diag.push(key, "expected a boolean").hint("use `true` or `false`");
            }
        }

        let line_break = ConfigKey::CssLineBreak.key();
        if let Some(value) = self.get_str(line_break)
            && value.trim().parse::<i64>().is_err()
        {
            diag.push(line_break, format!("expected an integer, found `{value}`"))
                .hint("use -1 to disable line breaks");
        }

        diag.into_result()
    }

    fn is_group_attr(&self, key: &str, attr: &str) -> bool {
        [ConfigKey::JsAssetPrefix, ConfigKey::CssAssetPrefix]
            .iter()
            .any(|prefix| {
                key.strip_prefix(prefix.key())
                    .and_then(|rest| rest.strip_prefix('.'))
                    .is_some_and(|rest| rest.ends_with(&format!(".{attr}")))
            })
    }

    // ------------------------------------------------------------------------
    // lookups
    // ------------------------------------------------------------------------

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ConfigValue::as_str)
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get_str(key).unwrap_or(default).to_string()
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get_str(key).and_then(parse_bool).unwrap_or(default)
    }

    /// Boolean lookup for a known key with its built-in default.
    pub fn flag(&self, key: ConfigKey) -> bool {
        self.get_bool(key.key(), key.default_bool())
    }

    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get_str(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key).map(ConfigValue::to_list).unwrap_or_default()
    }

    /// Entries at or below `prefix`, in file order, with the prefix removed.
    ///
    /// The key equal to `prefix` itself is returned with an empty suffix.
    pub fn subset<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a ConfigValue)> + 'a {
        self.entries.iter().filter_map(move |(key, value)| {
            let rest = key.strip_prefix(prefix)?;
            if rest.is_empty() {
                Some(("", value))
            } else {
                rest.strip_prefix('.').map(|suffix| (suffix, value))
            }
        })
    }

    // ------------------------------------------------------------------------
    // resolved paths
    // ------------------------------------------------------------------------

    /// Absolute web root (source directory).
    pub fn web_root(&self) -> PathBuf {
        let value = self.get_string(ConfigKey::WebRoot.key(), DEFAULT_WEB_ROOT);
        resolve_path(&value, &self.root)
    }

    /// Absolute output directory (transformed files and bundles).
    pub fn output_dir(&self) -> PathBuf {
        resolve_path(&self.output_dir_name(), &self.root)
    }

    fn output_dir_name(&self) -> String {
        self.get_string(ConfigKey::OutputDir.key(), DEFAULT_OUTPUT_DIR)
    }

    /// Public URL of the output directory, without trailing slash.
    pub fn output_url(&self) -> String {
        let default = format!("/{}", self.output_dir_name().trim_matches('/'));
        self.get_string(ConfigKey::OutputUrl.key(), &default)
            .trim_end_matches('/')
            .to_string()
    }

    /// Public URL of the web root, without trailing slash.
    pub fn web_root_url(&self) -> String {
        self.get_string(ConfigKey::WebRootUrl.key(), "")
            .trim_end_matches('/')
            .to_string()
    }

    /// Absolute path of the manifest file.
    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir()
            .join(self.get_string(ConfigKey::ManifestFile.key(), DEFAULT_MANIFEST_FILE))
    }
}

enum TomlFailure {
    Syntax(toml::de::Error),
    Shape(ConfigError),
}

// ============================================================================
// tests
// ============================================================================
