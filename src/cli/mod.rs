//! Command-line interface module.

mod args;
pub mod build;
pub mod groups;
pub mod render;

pub use args::{Cli, Commands, RenderArgs};
