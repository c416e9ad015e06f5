//! Utility modules shared by the pipeline and the resolver.

pub mod css;
pub mod html;
pub mod path;
pub mod plural;
