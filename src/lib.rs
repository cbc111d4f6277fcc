//! modgraph - a module dependency graph resolver
//!
//! This crate ingests module manifests (name, include paths, and public,
//! private and dynamic dependencies), validates them, and produces a
//! deterministic build plan: a cycle-free build order with propagated
//! include paths and link visibility.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test fixtures shared by unit tests.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{Manifest, Registry, RegistrySnapshot, Visibility};
pub use builder::BuildPlan;
pub use ops::{resolve, ResolveOptions};
pub use resolver::ResolveError;
