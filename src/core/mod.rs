//! Core data structures for modgraph.
//!
//! - Dependency references and their visibility
//! - Module manifests
//! - The module registry and its immutable snapshots

pub mod dependency;
pub mod manifest;
pub mod registry;

pub use dependency::{Dependency, Visibility};
pub use manifest::{Manifest, ManifestBuilder};
pub use registry::{LoadGuard, Registry, RegistrySnapshot};
