//! Module resolution.
//!
//! Turns a validated registry into a tagged-edge dependency graph, checks
//! static edges for cycles, orders modules for the build and propagates
//! include paths along public edges. Everything here is pure, in-memory and
//! deterministic: all I/O happens before resolution.

pub mod errors;
pub mod graph;
pub mod order;
pub mod visibility;

pub use errors::{ResolveError, UnresolvedRef};
pub use graph::{DepEdge, DependencyGraph, ModuleNode};
pub use order::{detect_cycle, BuildOrder};
pub use visibility::{propagate, EffectiveIncludes, ResolvedInclude};
