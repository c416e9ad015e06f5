//! Asset groups: named, configured sets of files bundled together.
//!
//! Groups are read from the `js.asset` / `css.asset` namespaces:
//!
//! ```toml
//! [js.asset]
//! vendor = ["lib/*.js"]                  # include patterns
//!
//! [js.asset.app]
//! include = ["app/**/*.js"]
//! exclude = ["app/**/*.test.js"]
//! gzip = false
//! ```
//!
//! Without any key in a namespace, a single default group (`script` or
//! `style`) includes every file of that type.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::config::{AssetConfig, ConfigKey, parse_bool};
use crate::matcher::PathMatcher;

use super::AssetType;

/// A named set of include/exclude patterns for one asset type.
///
/// Names are unique per type, not globally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetGroup {
    pub name: String,
    pub kind: AssetType,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub gzip: bool,
}

impl AssetGroup {
    /// The synthetic group holding every file of a type.
    pub fn default_for(kind: AssetType, gzip: bool) -> Self {
        Self {
            name: kind.default_group().to_string(),
            kind,
            includes: vec![kind.all_pattern()],
            excludes: vec![],
            gzip,
        }
    }

    /// Config-style key, e.g. `js.asset.vendor`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.kind.group_prefix().key(), self.name)
    }

    /// Bundle file name, e.g. `vendor.js`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.kind.extension())
    }

    pub fn bundle_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.file_name())
    }
}

/// Group attribute named by the last segment of a key below the prefix.
enum Attr {
    Include,
    Exclude,
    Gzip,
}

fn split_attr(suffix: &str) -> (&str, Attr) {
    for (tail, attr) in [
        (".include", Attr::Include),
        (".exclude", Attr::Exclude),
        (".gzip", Attr::Gzip),
    ] {
        if let Some(name) = suffix.strip_suffix(tail) {
            return (name, attr);
        }
    }
    (suffix, Attr::Include)
}

/// Turns configuration into groups and groups into file lists.
pub struct GroupResolver<'a> {
    config: &'a AssetConfig,
    matcher: &'a dyn PathMatcher,
}

impl<'a> GroupResolver<'a> {
    pub fn new(config: &'a AssetConfig, matcher: &'a dyn PathMatcher) -> Self {
        Self { config, matcher }
    }

    /// Groups of one type, in configuration order.
    pub fn groups(&self, kind: AssetType) -> Vec<AssetGroup> {
        let global_gzip = self.config.flag(ConfigKey::Gzip);
        let prefix = kind.group_prefix().key();
        let mut groups: Vec<AssetGroup> = Vec::new();

        for (suffix, value) in self.config.subset(prefix) {
            let (name, attr) = split_attr(suffix);
            let name = if name.is_empty() {
                kind.default_group()
            } else {
                name
            };

            let idx = match groups.iter().position(|g| g.name == name) {
                Some(idx) => idx,
                None => {
                    groups.push(AssetGroup {
                        name: name.to_string(),
                        kind,
                        includes: vec![],
                        excludes: vec![],
                        gzip: global_gzip,
                    });
                    groups.len() - 1
                }
            };

            let group = &mut groups[idx];
            match attr {
                Attr::Include => group.includes.extend(value.to_list()),
                Attr::Exclude => group.excludes.extend(value.to_list()),
                Attr::Gzip => {
                    group.gzip = value
                        .as_str()
                        .and_then(parse_bool)
                        .unwrap_or(global_gzip);
                }
            }
        }

        // A bare `js.asset` key without patterns still means "everything"
        for group in &mut groups {
            if group.name == kind.default_group() && group.includes.is_empty() {
                group.includes.push(kind.all_pattern());
            }
        }

        if groups.is_empty() {
            groups.push(AssetGroup::default_for(kind, global_gzip));
        }
        groups
    }

    /// Groups of every type, scripts first.
    pub fn all_groups(&self) -> Vec<AssetGroup> {
        AssetType::ALL
            .iter()
            .flat_map(|&kind| self.groups(kind))
            .collect()
    }

    /// Ordered, de-duplicated files of `group` found below `root`.
    ///
    /// Include patterns are applied in order (first-seen wins the position),
    /// then anything matched by an exclude pattern is dropped. Only files of
    /// the group's type are kept, and bundle artifacts in the output
    /// directory are never members. An empty result means "nothing to bundle".
    pub fn membership(&self, group: &AssetGroup, root: &Path) -> Vec<PathBuf> {
        let artifacts = self.artifacts_below(root);

        let mut seen = FxHashSet::default();
        let mut members = Vec::new();
        for pattern in &group.includes {
            for path in self.matcher.find(pattern, root) {
                if AssetType::from_path(&path) != Some(group.kind) || artifacts.contains(&path) {
                    continue;
                }
                if seen.insert(path.clone()) {
                    members.push(path);
                }
            }
        }

        if !group.excludes.is_empty() {
            let excluded: FxHashSet<PathBuf> = group
                .excludes
                .iter()
                .flat_map(|pattern| self.matcher.find(pattern, root))
                .collect();
            members.retain(|path| !excluded.contains(path));
        }
        members
    }

    /// Bundle paths of every group, when `root` is the output directory.
    fn artifacts_below(&self, root: &Path) -> FxHashSet<PathBuf> {
        if root != self.config.output_dir() {
            return FxHashSet::default();
        }
        self.all_groups()
            .iter()
            .map(|group| group.bundle_path(root))
            .collect()
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigValue;
    use std::collections::BTreeMap;

    /// In-memory matcher: a fixed file list per base directory.
    struct MemoryMatcher {
        files: BTreeMap<PathBuf, Vec<&'static str>>,
    }

    impl MemoryMatcher {
        fn new(base: &str, files: &[&'static str]) -> Self {
            let mut map = BTreeMap::new();
            map.insert(PathBuf::from(base), files.to_vec());
            Self { files: map }
        }
    }

    impl PathMatcher for MemoryMatcher {
        fn find(&self, pattern: &str, base: &Path) -> Vec<PathBuf> {
            let Ok(pattern) = glob::Pattern::new(pattern) else {
                return vec![];
            };
            let options = glob::MatchOptions {
                require_literal_separator: true,
                ..glob::MatchOptions::new()
            };
            let mut found: Vec<_> = self
                .files
                .get(base)
                .into_iter()
                .flatten()
                .filter(|rel| pattern.matches_with(rel, options))
                .map(|rel| base.join(rel))
                .collect();
            found.sort();
            found
        }
    }

    fn config(toml: &str) -> AssetConfig {
        AssetConfig::from_toml_str("/project", toml).unwrap()
    }

    const OUT: &str = "/project/assets";

    #[test]
    fn test_default_groups_without_config() {
        let config = config("");
        let matcher = MemoryMatcher::new(OUT, &[]);
        let resolver = GroupResolver::new(&config, &matcher);

        let groups = resolver.all_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], AssetGroup::default_for(AssetType::Script, true));
        assert_eq!(groups[1].name, "style");
        assert_eq!(groups[1].includes, vec!["**/*.css"]);
    }

    #[test]
    fn test_configured_groups_in_order() {
        let config = config(
            r#"
            gzip = false

            [js.asset]
            vendor = ["lib/*.js"]
            app = ["app/*.js"]

            [js.asset.admin]
            include = ["admin/*.js"]
            exclude = ["admin/debug.js"]
            gzip = true
            "#,
        );
        let matcher = MemoryMatcher::new(OUT, &[]);
        let resolver = GroupResolver::new(&config, &matcher);

        let groups = resolver.groups(AssetType::Script);
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["vendor", "app", "admin"]);
        assert!(!groups[0].gzip);
        assert!(groups[2].gzip);
        assert_eq!(groups[2].excludes, vec!["admin/debug.js"]);
        assert_eq!(groups[2].key(), "js.asset.admin");
        assert_eq!(groups[2].file_name(), "admin.js");

        // no css.asset keys: default style group
        let styles = resolver.groups(AssetType::Stylesheet);
        assert_eq!(styles, vec![AssetGroup::default_for(AssetType::Stylesheet, false)]);
    }

    #[test]
    fn test_same_name_across_types() {
        let config = config(
            r#"
            "js.asset.site" = ["*.js"]
            "css.asset.site" = ["*.css"]
            "#,
        );
        let matcher = MemoryMatcher::new(OUT, &[]);
        let resolver = GroupResolver::new(&config, &matcher);

        let groups = resolver.all_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].bundle_path(Path::new(OUT)), PathBuf::from("/project/assets/site.js"));
        assert_eq!(groups[1].bundle_path(Path::new(OUT)), PathBuf::from("/project/assets/site.css"));
    }

    #[test]
    fn test_bare_prefix_is_default_group() {
        let config = AssetConfig::empty("/project")
            .with("js.asset", ConfigValue::List(vec!["lib/*.js".into()]));
        let matcher = MemoryMatcher::new(OUT, &[]);
        let groups = GroupResolver::new(&config, &matcher).groups(AssetType::Script);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "script");
        assert_eq!(groups[0].includes, vec!["lib/*.js"]);

        let config = AssetConfig::empty("/project")
            .with("js.asset", ConfigValue::Scalar(String::new()));
        let groups = GroupResolver::new(&config, &matcher).groups(AssetType::Script);
        assert_eq!(groups[0].includes, vec!["**/*.js"]);
    }

    #[test]
    fn test_membership_first_seen_order_without_duplicates() {
        let config = config(r#""js.asset.all" = ["lib/b.js", "lib/*.js", "app/*.js"]"#);
        let matcher = MemoryMatcher::new(OUT, &["lib/a.js", "lib/b.js", "app/main.js"]);
        let resolver = GroupResolver::new(&config, &matcher);

        let group = &resolver.groups(AssetType::Script)[0];
        let members = resolver.membership(group, Path::new(OUT));
        assert_eq!(
            members,
            vec![
                PathBuf::from("/project/assets/lib/b.js"),
                PathBuf::from("/project/assets/lib/a.js"),
                PathBuf::from("/project/assets/app/main.js"),
            ]
        );
    }

    #[test]
    fn test_membership_excludes() {
        let config = config(
            r#"
            [js.asset.app]
            include = ["**/*.js"]
            exclude = ["**/*.test.js", "vendor/*"]
            "#,
        );
        let matcher = MemoryMatcher::new(
            OUT,
            &["app/a.js", "app/a.test.js", "vendor/x.js", "main.js"],
        );
        let resolver = GroupResolver::new(&config, &matcher);

        let group = &resolver.groups(AssetType::Script)[0];
        let members = resolver.membership(group, Path::new(OUT));
        assert_eq!(
            members,
            vec![
                PathBuf::from("/project/assets/app/a.js"),
                PathBuf::from("/project/assets/main.js"),
            ]
        );

        // every member matches an include, none matches an exclude
        let exclude: Vec<_> = group
            .excludes
            .iter()
            .map(|p| glob::Pattern::new(p).unwrap())
            .collect();
        for member in &members {
            let rel = member.strip_prefix(OUT).unwrap().to_str().unwrap();
            assert!(!exclude.iter().any(|p| p.matches(rel)));
        }
    }

    #[test]
    fn test_membership_skips_bundles_and_other_types() {
        let config = config(r#""js.asset.vendor" = ["**/*"]"#);
        let matcher = MemoryMatcher::new(OUT, &["lib/a.js", "lib/a.css", "vendor.js", "script.js"]);
        let resolver = GroupResolver::new(&config, &matcher);

        let group = &resolver.groups(AssetType::Script)[0];
        let members = resolver.membership(group, Path::new(OUT));
        // vendor.js is this group's own bundle; script.js is a plain file here
        assert_eq!(
            members,
            vec![
                PathBuf::from("/project/assets/lib/a.js"),
                PathBuf::from("/project/assets/script.js"),
            ]
        );
    }

    #[test]
    fn test_membership_empty_when_nothing_matches() {
        let config = config(r#""css.asset.print" = ["print/*.css"]"#);
        let matcher = MemoryMatcher::new(OUT, &["screen.css"]);
        let resolver = GroupResolver::new(&config, &matcher);

        let group = &resolver.groups(AssetType::Stylesheet)[0];
        assert!(resolver.membership(group, Path::new(OUT)).is_empty());
    }
}
