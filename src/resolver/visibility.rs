//! Include path and link propagation.
//!
//! For each module the propagator computes the include directories its own
//! sources compile against:
//!
//! 1. The module's own exported paths, then its private paths
//! 2. The exported paths of every static dependency, plus everything those
//!    dependencies re-export through their own public dependencies
//!
//! A module re-exports itself and whatever its public dependencies
//! re-export. Private dependencies stop there: their paths reach the
//! declaring module but none of its dependents. Dynamic dependencies
//! contribute nothing at build time.
//!
//! The same walk yields the link closure: modules reached only through a
//! dependency's re-exports are reported as inherited.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

use petgraph::graph::NodeIndex;

use crate::core::{Manifest, Visibility};
use crate::resolver::errors::ResolveError;
use crate::resolver::graph::DependencyGraph;
use crate::resolver::order::BuildOrder;

/// One include directory in a module's compile context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInclude {
    /// The path as declared
    pub path: String,
    /// Physical location the path resolves to
    pub location: PathBuf,
    /// Module that declared the path
    pub origin: String,
}

/// Include directories and link closure for one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveIncludes {
    pub includes: Vec<ResolvedInclude>,

    /// Modules reached through a dependency's re-exports but not declared
    /// directly, in build order with externals last
    pub inherited: Vec<String>,

    /// Modules re-exposed to this module's dependents, itself excluded
    pub reexports: Vec<String>,
}

impl EffectiveIncludes {
    /// Include paths as declared, in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.includes.iter().map(|include| include.path.as_str())
    }

    /// Whether any entry came from `origin`.
    pub fn has_origin(&self, origin: &str) -> bool {
        self.includes.iter().any(|include| include.origin == origin)
    }

    /// Whether `name` is re-exposed to dependents.
    pub fn reexports(&self, name: &str) -> bool {
        self.reexports.iter().any(|reexport| reexport == name)
    }
}

/// A set of modules, planned ones by build-order position.
#[derive(Debug, Clone, Default)]
struct ModuleSet {
    planned: BTreeSet<usize>,
    externals: BTreeSet<String>,
}

impl ModuleSet {
    fn extend(&mut self, other: &ModuleSet) {
        self.planned.extend(other.planned.iter().copied());
        self.externals.extend(other.externals.iter().cloned());
    }

    fn names(&self, graph: &DependencyGraph, order: &BuildOrder) -> Vec<String> {
        self.planned
            .iter()
            .filter_map(|&position| order.at(position))
            .map(|node| graph.name(node).to_string())
            .chain(self.externals.iter().cloned())
            .collect()
    }
}

/// Accumulates a module's include list, dropping repeats.
struct IncludeSet<'a> {
    module: &'a str,
    strict: bool,
    includes: Vec<ResolvedInclude>,
    seen: HashSet<PathBuf>,
    /// Locations of paths exported by public ancestors
    by_path: HashMap<String, PathBuf>,
}

impl<'a> IncludeSet<'a> {
    fn new(module: &'a str, strict: bool) -> Self {
        IncludeSet {
            module,
            strict,
            includes: Vec::new(),
            seen: HashSet::new(),
            by_path: HashMap::new(),
        }
    }

    /// Append `paths` declared by `origin`.
    ///
    /// Only paths from public ancestors take part in the ambiguity check.
    fn extend(
        &mut self,
        origin: &Manifest,
        paths: &[String],
        public_ancestor: bool,
    ) -> Result<(), ResolveError> {
        for path in paths {
            let location = origin.locate(path);

            if public_ancestor {
                match self.by_path.get(path) {
                    Some(existing) if *existing == location => {}
                    Some(existing) if self.strict => {
                        return Err(ResolveError::VisibilityConflict {
                            module: self.module.to_string(),
                            include: path.clone(),
                            path_a: existing.display().to_string(),
                            path_b: location.display().to_string(),
                        });
                    }
                    Some(existing) => {
                        tracing::debug!(
                            "Include `{}` of {} resolves to both {} and {}",
                            path,
                            self.module,
                            existing.display(),
                            location.display()
                        );
                    }
                    None => {
                        self.by_path.insert(path.clone(), location.clone());
                    }
                }
            }

            // Same physical directory from two routes
            if !self.seen.insert(location.clone()) {
                continue;
            }

            self.includes.push(ResolvedInclude {
                path: path.clone(),
                location,
                origin: origin.name().to_string(),
            });
        }

        Ok(())
    }
}

/// Compute effective include paths and link closure for every module in `order`.
///
/// Inherited paths are grouped by origin module, origins sorted by their
/// position in the build order. In strict mode, two public ancestors
/// exporting the same declared path at different directories fail with
/// `VisibilityConflict`. The module's own paths and paths reached only
/// through private dependencies are never checked.
pub fn propagate(
    graph: &DependencyGraph,
    order: &BuildOrder,
    strict: bool,
) -> Result<HashMap<NodeIndex, EffectiveIncludes>, ResolveError> {
    // What each module re-exports, itself included
    let mut exports: HashMap<NodeIndex, ModuleSet> = HashMap::new();
    let mut effective = HashMap::new();

    for (position, node) in order.iter().enumerate() {
        let Some(manifest) = graph.module(node).manifest() else {
            continue;
        };

        let mut exported = ModuleSet::default();
        exported.planned.insert(position);
        let mut reached = ModuleSet::default();
        let mut direct = HashSet::new();

        for (dep, visibility) in graph.deps(node, Visibility::is_static) {
            direct.insert(graph.name(dep));

            if graph.module(dep).is_external() {
                let name = graph.name(dep).to_string();
                if visibility.is_public() {
                    exported.externals.insert(name.clone());
                }
                reached.externals.insert(name);
                continue;
            }

            let Some(dep_exports) = exports.get(&dep) else {
                continue;
            };

            reached.extend(dep_exports);
            if visibility.is_public() {
                exported.extend(dep_exports);
            }
        }

        let mut includes = IncludeSet::new(manifest.name(), strict);
        includes.extend(manifest, manifest.include_paths(), false)?;
        includes.extend(manifest, manifest.private_include_paths(), false)?;

        for &origin in &reached.planned {
            let origin_manifest = order
                .at(origin)
                .and_then(|origin_node| graph.module(origin_node).manifest());

            if let Some(origin_manifest) = origin_manifest {
                let public_ancestor = exported.planned.contains(&origin);
                includes.extend(
                    origin_manifest,
                    origin_manifest.include_paths(),
                    public_ancestor,
                )?;
            }
        }

        let inherited = reached
            .names(graph, order)
            .into_iter()
            .filter(|name| !direct.contains(name.as_str()))
            .collect();
        let reexports = exported
            .names(graph, order)
            .into_iter()
            .filter(|name| name != manifest.name())
            .collect();

        effective.insert(
            node,
            EffectiveIncludes {
                includes: includes.includes,
                inherited,
                reexports,
            },
        );
        exports.insert(node, exported);
    }

    tracing::debug!("Propagated include paths for {} modules", effective.len());

    Ok(effective)
}
