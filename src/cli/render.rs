//! `bale render`: print the include fragment a template would embed.
//!
//! Runs with logging silenced (see `Cli::verbosity`), so stdout carries the
//! fragment and nothing else.

use std::path::Path;

use anyhow::Result;

use crate::config::AssetConfig;
use crate::matcher::FsMatcher;
use crate::resolve::RuntimeResolver;

use super::RenderArgs;

/// Print the fragment for one group to stdout.
pub fn render_group(root: &Path, config_file: Option<&Path>, args: &RenderArgs) -> Result<()> {
    let html = render_fragment(root, config_file, args)?;
    if !html.is_empty() {
        println!("{html}");
    }
    Ok(())
}

/// The fragment for one group.
///
/// An explicitly named config file must load; otherwise a broken or missing
/// config falls back to defaults, as it would inside a page render.
fn render_fragment(root: &Path, config_file: Option<&Path>, args: &RenderArgs) -> Result<String> {
    let resolver = match config_file {
        Some(path) => RuntimeResolver::new(AssetConfig::load(root, Some(path), &FsMatcher::new())?),
        None => RuntimeResolver::for_project(root),
    };

    crate::debug!("render"; "{:?} mode", resolver.mode());
    Ok(resolver.render(args.kind, &args.group, args.media.as_deref()))
}
