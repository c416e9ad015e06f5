//! Runtime include resolution for page templates.
//!
//! Given `(type, group, media)`, produce the HTML to inject into a page:
//!
//! - **development**: one tag per file matched by the group's patterns, so
//!   each file can be debugged on its own
//! - **production**: one tag for the bundle, with `?<mtime millis>` appended
//!
//! The mode is re-read on every call: the `BALE_ENV` environment variable
//! wins, then the `environment` config key. Empty or `development` selects
//! development mode.
//!
//! Nothing here fails visibly: a missing bundle, group or directory renders
//! as an empty (or shorter) fragment. A build in progress therefore looks
//! like a temporarily absent bundle.

use std::path::Path;

use crate::asset::version::{compute_version, versioned_url};
use crate::asset::{AssetGroup, AssetType, GroupResolver};
use crate::config::{AssetConfig, ConfigKey, DEVELOPMENT};
use crate::debug;
use crate::matcher::{FsMatcher, PathMatcher};
use crate::utils::html::{script_tag, stylesheet_link};
use crate::utils::path::rel_slash;

/// Process-level environment override.
pub const ENV_VAR: &str = "BALE_ENV";

/// Default `media` for stylesheet links.
pub const DEFAULT_MEDIA: &str = "all";

/// Emission mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    /// Empty or `development` (any case) means development.
    pub fn from_environment(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(DEVELOPMENT) {
            Self::Development
        } else {
            Self::Production
        }
    }
}

/// Read-only resolver; safe to share between threads and call repeatedly.
pub struct RuntimeResolver {
    config: AssetConfig,
    matcher: Box<dyn PathMatcher>,
    env_var: Option<&'static str>,
}

impl RuntimeResolver {
    pub fn new(config: AssetConfig) -> Self {
        Self {
            config,
            matcher: Box::new(FsMatcher::new()),
            env_var: Some(ENV_VAR),
        }
    }

    /// Load configuration for `root`, falling back to defaults on any error.
    pub fn for_project(root: &Path) -> Self {
        let matcher = FsMatcher::new();
        let config = AssetConfig::load(root, None, &matcher).unwrap_or_else(|e| {
            debug!("render"; "using default configuration: {}", e);
            AssetConfig::empty(root)
        });
        Self::new(config)
    }

    /// Environment variable consulted before the config (`None` ignores the
    /// process environment).
    #[cfg(test)]
    pub fn with_env_var(mut self, var: Option<&'static str>) -> Self {
        self.env_var = var;
        self
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        let from_env = self
            .env_var
            .and_then(|var| std::env::var(var).ok())
            .filter(|v| !v.trim().is_empty());
        let value = from_env.unwrap_or_else(|| self.config.get_string(ConfigKey::Environment.key(), ""));
        Mode::from_environment(&value)
    }

    /// HTML for one group, tags joined by newlines.
    ///
    /// `media` applies to stylesheets only and defaults to `all`.
    pub fn render(&self, kind: AssetType, group: &str, media: Option<&str>) -> String {
        let urls = match self.mode() {
            Mode::Development => self.development_urls(kind, group),
            Mode::Production => self.production_url(kind, group).into_iter().collect(),
        };

        let media = media.unwrap_or(DEFAULT_MEDIA);
        urls.iter()
            .map(|url| match kind {
                AssetType::Script => script_tag(url),
                AssetType::Stylesheet => stylesheet_link(url, media),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// URLs of every file the group matches, output directory first.
    pub fn development_urls(&self, kind: AssetType, group: &str) -> Vec<String> {
        let resolver = GroupResolver::new(&self.config, self.matcher.as_ref());
        let Some(group) = find_group(resolver.groups(kind), group) else {
            debug!("render"; "no {} group named `{}`", kind, group);
            return vec![];
        };

        let output_dir = self.config.output_dir();
        let (base, base_url) = if output_dir.is_dir() {
            (output_dir, self.config.output_url())
        } else {
            (self.config.web_root(), self.config.web_root_url())
        };

        resolver
            .membership(&group, &base)
            .iter()
            .filter_map(|path| rel_slash(path, &base))
            .map(|rel| format!("{base_url}/{rel}"))
            .collect()
    }

    /// Versioned bundle URL, or `None` when the bundle doesn't exist (yet).
    pub fn production_url(&self, kind: AssetType, group: &str) -> Option<String> {
        let file_name = format!("{group}.{}", kind.extension());
        let bundle = self.config.output_dir().join(&file_name);
        let version = compute_version(&bundle)?;
        let url = format!("{}/{file_name}", self.config.output_url());
        Some(versioned_url(&url, &version))
    }
}

fn find_group(groups: Vec<AssetGroup>, name: &str) -> Option<AssetGroup> {
    groups.into_iter().find(|g| g.name == name)
}

// ============================================================================
// tests
// ============================================================================
