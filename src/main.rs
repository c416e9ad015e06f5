//! Bale - A static asset pipeline: lint, minify, bundle and gzip scripts and
//! stylesheets, then resolve page includes per environment.

mod asset;
mod cli;
mod config;
mod error;
mod logger;
mod matcher;
mod pipeline;
mod resolve;
mod transform;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbosity(cli.verbosity());

    let root = utils::path::normalize_path(&cli.root);
    let config_file = cli.config.as_deref();
    match &cli.command {
        Commands::Build { .. } => cli::build::build_assets(&root, config_file),
        Commands::Render { args } => cli::render::render_group(&root, config_file, args),
        Commands::Groups => cli::groups::list_groups(&root, config_file),
    }
}
