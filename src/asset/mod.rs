//! Asset model: types, discovery, groups and bundles.

pub mod bundle;
mod group;
mod kind;
mod scan;
pub mod version;

// Types
pub use group::{AssetGroup, GroupResolver};
pub use kind::AssetType;

// Scanning (pure functions)
pub use scan::{SourceFile, scan_sources};

// Bundling (side effects)
pub use bundle::{BundleArtifact, combine};
