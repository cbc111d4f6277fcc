//! Top-level resolution.
//!
//! Runs every stage over one registry snapshot: validation, graph
//! construction, ordering, include propagation and plan emission. The
//! result is either a complete plan or the first fatal error.

use crate::builder::plan::BuildPlan;
use crate::core::{Registry, RegistrySnapshot};
use crate::resolver::errors::ResolveError;
use crate::resolver::graph::DependencyGraph;
use crate::resolver::order::BuildOrder;
use crate::resolver::visibility::propagate;

/// Options controlling a resolution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Fail on include paths that resolve to two different directories
    pub strict: bool,
}

impl ResolveOptions {
    pub fn strict() -> Self {
        ResolveOptions { strict: true }
    }
}

/// Resolve a registry into a build plan.
///
/// Fails with `RegistryNotFinalized` if loads are still outstanding.
pub fn resolve(registry: &Registry, options: &ResolveOptions) -> Result<BuildPlan, ResolveError> {
    let snapshot = registry.snapshot()?;
    resolve_snapshot(&snapshot, options)
}

/// Resolve an already frozen registry.
pub fn resolve_snapshot(
    snapshot: &RegistrySnapshot,
    options: &ResolveOptions,
) -> Result<BuildPlan, ResolveError> {
    let graph = DependencyGraph::build(snapshot)?;
    let order = BuildOrder::compute(&graph)?;
    let includes = propagate(&graph, &order, options.strict)?;
    let plan = BuildPlan::emit(&graph, &order, &includes);

    tracing::info!("Resolved {} modules", plan.len());

    Ok(plan)
}
