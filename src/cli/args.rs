//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::asset::AssetType;
use crate::logger::Verbosity;

/// Bale static asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Project root (default: current directory)
    #[arg(short, long, global = true, default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub root: PathBuf,

    /// Config file path (default: bale.toml or bale.properties, searched from the root)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Lint, minify and bundle all assets
    #[command(visible_alias = "b")]
    Build {
        /// Only print errors
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the HTML include fragment for a group
    #[command(visible_alias = "r")]
    Render {
        #[command(flatten)]
        args: RenderArgs,
    },

    /// List configured groups and the files they match
    #[command(visible_alias = "g")]
    Groups,
}

impl Cli {
    /// Output level for this invocation.
    ///
    /// `render` output is embedded into pages as-is, so it never logs.
    pub fn verbosity(&self) -> Verbosity {
        match self.command {
            Commands::Build { quiet } => Verbosity::from_flags(self.verbose, quiet),
            Commands::Render { .. } => Verbosity::Quiet,
            Commands::Groups => Verbosity::from_flags(self.verbose, false),
        }
    }
}

/// Render command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct RenderArgs {
    /// Asset type: `script` (js) or `style` (css)
    #[arg(value_parser = parse_asset_type)]
    pub kind: AssetType,

    /// Group name, e.g. `vendor`
    pub group: String,

    /// `media` attribute for stylesheets
    #[arg(short, long)]
    pub media: Option<String>,
}

fn parse_asset_type(s: &str) -> Result<AssetType, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::try_parse_from(["bale", "build", "--quiet", "--root", "site"]).unwrap();
        assert!(matches!(cli.command, Commands::Build { quiet: true }));
        assert_eq!(cli.root, PathBuf::from("site"));
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from(["bale", "render", "css", "print", "--media", "print"]).unwrap();
        let Commands::Render { args } = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.kind, AssetType::Stylesheet);
        assert_eq!(args.group, "print");
        assert_eq!(args.media.as_deref(), Some("print"));

        assert!(Cli::try_parse_from(["bale", "render", "png", "x"]).is_err());
    }

    #[test]
    fn test_verbose_flag_with_subcommand() {
        let cli = Cli::try_parse_from(["bale", "-v", "groups"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.verbosity(), Verbosity::Verbose);

        let cli = Cli::try_parse_from(["bale", "build", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.verbosity(), Verbosity::Verbose);

        let cli = Cli::try_parse_from(["bale", "build", "-v", "-q"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_version_flag_still_available() {
        let err = Cli::try_parse_from(["bale", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_render_is_always_quiet() {
        let cli = Cli::try_parse_from(["bale", "--verbose", "render", "js", "vendor"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_command_required() {
        assert!(Cli::try_parse_from(["bale"]).is_err());
    }
}
