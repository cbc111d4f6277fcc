//! High-level operations

pub mod load;
pub mod resolve;

pub use load::{discover_manifests, load_manifest, load_registry, ManifestContext, ManifestFile};
pub use resolve::{resolve, resolve_snapshot, ResolveOptions};
