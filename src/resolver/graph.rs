//! DependencyGraph - the tagged-edge module graph.
//!
//! One directed graph holds every dependency kind. An edge points from the
//! declaring module to the module it depends on and carries the declared
//! visibility, so traversals select the edges they care about with a
//! visibility predicate instead of walking separate graphs.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::core::{Manifest, RegistrySnapshot, Visibility};
use crate::resolver::errors::ResolveError;

/// A module in the graph.
#[derive(Debug, Clone)]
pub struct ModuleNode {
    name: String,
    /// None for modules resolvable outside this build
    manifest: Option<Manifest>,
}

impl ModuleNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    pub fn is_external(&self) -> bool {
        self.manifest.is_none()
    }
}

/// A dependency edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepEdge {
    pub visibility: Visibility,
    /// Name of the manifest that declared the dependency
    pub declared_by: String,
}

/// The validated dependency graph.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<ModuleNode, DepEdge>,

    /// Map from module name to node index
    name_to_node: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph from a registry snapshot.
    ///
    /// The snapshot is validated first. Nodes are added in lexicographic
    /// order (registered modules, then externals), so the graph does not
    /// depend on the order manifests were loaded in.
    pub fn build(registry: &RegistrySnapshot) -> Result<Self, ResolveError> {
        registry.validate()?;

        let mut graph = DependencyGraph {
            graph: DiGraph::new(),
            name_to_node: HashMap::new(),
        };

        for manifest in registry.manifests() {
            graph.add_node(manifest.name(), Some(manifest.clone()));
        }
        for name in registry.externals() {
            graph.add_node(name, None);
        }

        for manifest in registry.manifests() {
            for dep in manifest.dependencies() {
                if dep.name() == manifest.name() {
                    return Err(ResolveError::SelfDependency {
                        module: manifest.name().to_string(),
                    });
                }
                graph.add_edge(manifest.name(), dep.name(), dep.visibility());
            }
        }

        tracing::debug!(
            "Built dependency graph: {} modules, {} edges",
            graph.graph.node_count(),
            graph.graph.edge_count()
        );

        Ok(graph)
    }

    fn add_node(&mut self, name: &str, manifest: Option<Manifest>) {
        if self.name_to_node.contains_key(name) {
            return;
        }

        let node = self.graph.add_node(ModuleNode {
            name: name.to_string(),
            manifest,
        });
        self.name_to_node.insert(name.to_string(), node);
    }

    /// Add an edge unless the same (from, to, visibility) edge exists.
    fn add_edge(&mut self, from: &str, to: &str, visibility: Visibility) {
        if let (Some(&from_node), Some(&to_node)) =
            (self.name_to_node.get(from), self.name_to_node.get(to))
        {
            let exists = self
                .graph
                .edges_connecting(from_node, to_node)
                .any(|edge| edge.weight().visibility == visibility);

            if !exists {
                self.graph.add_edge(
                    from_node,
                    to_node,
                    DepEdge {
                        visibility,
                        declared_by: from.to_string(),
                    },
                );
            }
        }
    }

    /// Get a node index by module name.
    pub fn node(&self, name: &str) -> Option<NodeIndex> {
        self.name_to_node.get(name).copied()
    }

    /// Get the module stored at a node.
    pub fn module(&self, node: NodeIndex) -> &ModuleNode {
        &self.graph[node]
    }

    pub fn name(&self, node: NodeIndex) -> &str {
        &self.graph[node].name
    }

    /// Registered (non-external) modules, sorted by name.
    pub fn modules(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .node_indices()
            .filter(move |&node| !self.graph[node].is_external())
    }

    /// Number of registered modules.
    pub fn module_count(&self) -> usize {
        self.modules().count()
    }

    /// Number of nodes, externals included.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Upper bound on node indices, for index-addressed side tables.
    pub fn node_bound(&self) -> usize {
        self.graph.node_count()
    }

    /// Direct dependencies whose edge visibility passes `filter`, sorted by name.
    pub fn deps<F>(&self, node: NodeIndex, filter: F) -> Vec<(NodeIndex, Visibility)>
    where
        F: Fn(Visibility) -> bool,
    {
        self.neighbors(node, Direction::Outgoing, filter)
    }

    /// Direct dependents whose edge visibility passes `filter`, sorted by name.
    pub fn dependents<F>(&self, node: NodeIndex, filter: F) -> Vec<(NodeIndex, Visibility)>
    where
        F: Fn(Visibility) -> bool,
    {
        self.neighbors(node, Direction::Incoming, filter)
    }

    fn neighbors<F>(
        &self,
        node: NodeIndex,
        direction: Direction,
        filter: F,
    ) -> Vec<(NodeIndex, Visibility)>
    where
        F: Fn(Visibility) -> bool,
    {
        let mut result: Vec<_> = self
            .graph
            .edges_directed(node, direction)
            .filter(|edge| filter(edge.weight().visibility))
            .map(|edge| {
                // No self-loops, so the far end is whichever endpoint isn't `node`
                let other = if edge.source() == node {
                    edge.target()
                } else {
                    edge.source()
                };
                (other, edge.weight().visibility)
            })
            .collect();

        result.sort_by(|a, b| self.name(a.0).cmp(self.name(b.0)).then(a.1.cmp(&b.1)));
        result
    }

    /// The edge from `from` to `to`, if any.
    pub fn edge(&self, from: NodeIndex, to: NodeIndex) -> Option<&DepEdge> {
        self.graph
            .edges_connecting(from, to)
            .next()
            .map(|edge| edge.weight())
    }

    /// All modules reachable from `node` over edges passing `filter`.
    pub fn transitive_deps<F>(&self, node: NodeIndex, filter: F) -> HashSet<NodeIndex>
    where
        F: Fn(Visibility) -> bool,
    {
        let mut visited = HashSet::new();
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            if visited.insert(current) {
                for (dep, _) in self.deps(current, &filter) {
                    stack.push(dep);
                }
            }
        }

        visited.remove(&node);
        visited
    }
}
