//! `bale groups`: show configured groups and what they match.

use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::asset::GroupResolver;
use crate::config::AssetConfig;
use crate::matcher::FsMatcher;
use crate::utils::path::rel_slash;
use crate::utils::plural::plural_count;

/// List every group with the source files its patterns match.
pub fn list_groups(root: &Path, config_file: Option<&Path>) -> Result<()> {
    let matcher = FsMatcher::new();
    let config = AssetConfig::load(root, config_file, &matcher)?;
    let resolver = GroupResolver::new(&config, &matcher);
    let web_root = config.web_root();

    match config.source() {
        Some(path) => println!("{} {}", "config".dimmed(), path.display()),
        None => println!("{}", "no config file, using defaults".dimmed()),
    }
    for group in resolver.all_groups() {
        let members = resolver.membership(&group, &web_root);
        let gzip = if group.gzip { " +gzip" } else { "" };
        println!(
            "{} {}{}",
            group.key().bold(),
            plural_count(members.len(), "file").dimmed(),
            gzip.dimmed()
        );
        for member in &members {
            let rel = rel_slash(member, &web_root).unwrap_or_else(|| member.display().to_string());
            println!("  {rel}");
        }
    }
    Ok(())
}
