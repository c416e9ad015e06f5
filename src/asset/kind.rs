//! Asset type definitions.

use std::path::Path;

use crate::config::ConfigKey;

/// Kind of source asset handled by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetType {
    /// JavaScript (`.js`)
    Script,
    /// CSS (`.css`)
    Stylesheet,
}

impl AssetType {
    pub const ALL: [AssetType; 2] = [AssetType::Script, AssetType::Stylesheet];

    /// File extension without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Script => "js",
            Self::Stylesheet => "css",
        }
    }

    /// Name of the synthetic group used when none is configured.
    pub const fn default_group(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Stylesheet => "style",
        }
    }

    /// Config namespace holding this type's groups.
    pub const fn group_prefix(self) -> ConfigKey {
        match self {
            Self::Script => ConfigKey::JsAssetPrefix,
            Self::Stylesheet => ConfigKey::CssAssetPrefix,
        }
    }

    /// Pattern matching every file of this type.
    pub fn all_pattern(self) -> String {
        format!("**/*.{}", self.extension())
    }

    /// Detect the type from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "js" => Some(Self::Script),
            "css" => Some(Self::Stylesheet),
            _ => None,
        }
    }

    /// Whether the file name marks it as already minified
    /// (`app.min.js`, `app-min.js`).
    pub fn is_preminified(path: &Path) -> bool {
        path.file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.ends_with(".min") || stem.ends_with("-min"))
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.default_group())
    }
}

impl std::str::FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "js" | "script" | "javascript" => Ok(Self::Script),
            "css" | "style" | "stylesheet" => Ok(Self::Stylesheet),
            other => Err(format!("unknown asset type `{other}` (expected script or style)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(AssetType::from_path(Path::new("a/b.js")), Some(AssetType::Script));
        assert_eq!(
            AssetType::from_path(Path::new("site.css")),
            Some(AssetType::Stylesheet)
        );
        assert_eq!(AssetType::from_path(Path::new("logo.png")), None);
    }

    #[test]
    fn test_is_preminified() {
        assert!(AssetType::is_preminified(Path::new("jquery.min.js")));
        assert!(AssetType::is_preminified(Path::new("reset-min.css")));
        assert!(!AssetType::is_preminified(Path::new("admin.js")));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("script".parse::<AssetType>(), Ok(AssetType::Script));
        assert_eq!("CSS".parse::<AssetType>(), Ok(AssetType::Stylesheet));
        assert!("image".parse::<AssetType>().is_err());
    }
}
