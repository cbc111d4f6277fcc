//! Cycle detection and build ordering.
//!
//! Only static (public and private) edges constrain the build. Dynamic
//! dependencies are resolved at load time, so a dynamic cycle is legal and
//! dynamic edges never influence the order.

use std::collections::{BTreeMap, HashMap};

use petgraph::graph::NodeIndex;

use crate::core::Visibility;
use crate::resolver::errors::ResolveError;
use crate::resolver::graph::DependencyGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Fail with `CyclicDependency` if static edges form a cycle.
///
/// Three-color depth-first search. Roots and neighbours are visited in
/// lexicographic order, so the reported cycle is stable across runs. The
/// cycle path starts and ends at the same module.
pub fn detect_cycle(graph: &DependencyGraph) -> Result<(), ResolveError> {
    let mut marks = vec![Mark::Unvisited; graph.node_bound()];

    for root in graph.modules() {
        if marks[root.index()] != Mark::Unvisited {
            continue;
        }

        marks[root.index()] = Mark::InProgress;
        let mut stack = vec![(root, static_deps(graph, root).into_iter())];

        while let Some(frame) = stack.last_mut() {
            match frame.1.next() {
                Some(dep) => match marks[dep.index()] {
                    Mark::Unvisited => {
                        marks[dep.index()] = Mark::InProgress;
                        stack.push((dep, static_deps(graph, dep).into_iter()));
                    }
                    Mark::InProgress => {
                        // Every in-progress node is on the stack
                        let start = stack
                            .iter()
                            .position(|(node, _)| *node == dep)
                            .unwrap_or(0);
                        let mut cycle: Vec<String> = stack[start..]
                            .iter()
                            .map(|(node, _)| graph.name(*node).to_string())
                            .collect();
                        cycle.push(graph.name(dep).to_string());
                        return Err(ResolveError::CyclicDependency { cycle });
                    }
                    Mark::Done => {}
                },
                None => {
                    if let Some((node, _)) = stack.pop() {
                        marks[node.index()] = Mark::Done;
                    }
                }
            }
        }
    }

    Ok(())
}

fn static_deps(graph: &DependencyGraph, node: NodeIndex) -> Vec<NodeIndex> {
    graph
        .deps(node, Visibility::is_static)
        .into_iter()
        .map(|(dep, _)| dep)
        .collect()
}

/// A valid build order over the registered modules.
///
/// Every module comes after all modules it statically depends on.
/// External modules are not part of the order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOrder {
    order: Vec<NodeIndex>,
    position: HashMap<NodeIndex, usize>,
}

impl BuildOrder {
    /// Check for cycles, then order modules with Kahn's algorithm.
    ///
    /// Among modules whose static dependencies are all placed, the
    /// lexicographically smallest name goes next.
    pub fn compute(graph: &DependencyGraph) -> Result<Self, ResolveError> {
        detect_cycle(graph)?;

        let is_planned = |node: NodeIndex| !graph.module(node).is_external();

        let mut remaining: HashMap<NodeIndex, usize> = HashMap::new();
        let mut ready: BTreeMap<&str, NodeIndex> = BTreeMap::new();

        for node in graph.modules() {
            let count = static_deps(graph, node)
                .into_iter()
                .filter(|&dep| is_planned(dep))
                .count();

            if count == 0 {
                ready.insert(graph.name(node), node);
            } else {
                remaining.insert(node, count);
            }
        }

        let mut order = Vec::with_capacity(graph.module_count());

        while let Some((_, node)) = ready.pop_first() {
            order.push(node);

            for (dependent, _) in graph.dependents(node, Visibility::is_static) {
                if let Some(count) = remaining.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        remaining.remove(&dependent);
                        ready.insert(graph.name(dependent), dependent);
                    }
                }
            }
        }

        debug_assert!(remaining.is_empty(), "cycle survived detection");

        let position = order
            .iter()
            .enumerate()
            .map(|(i, &node)| (node, i))
            .collect();

        tracing::debug!("Ordered {} modules", order.len());

        Ok(BuildOrder { order, position })
    }

    /// Modules in build order (dependencies first).
    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.order.iter().copied()
    }

    /// Position of a module in the order.
    pub fn position(&self, node: NodeIndex) -> Option<usize> {
        self.position.get(&node).copied()
    }

    /// Module at the given position.
    pub fn at(&self, position: usize) -> Option<NodeIndex> {
        self.order.get(position).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Module names in build order.
    pub fn names<'g>(&self, graph: &'g DependencyGraph) -> Vec<&'g str> {
        self.order.iter().map(|&node| graph.name(node)).collect()
    }
}
