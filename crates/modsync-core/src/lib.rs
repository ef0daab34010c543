mod manifest;
mod source;

pub use manifest::{find_manifest, read_manifest, ManifestSummary, MANIFEST_SUFFIX};
pub use source::{GitHubCoordinate, ModuleSource, DEFAULT_BRANCH};

pub const DEFAULT_VERSION: &str = "0.0.0";
