//! Build plan emission.
//!
//! A BuildPlan lists every registered module in build order together with
//! its resolved include directories, its static link set and the modules it
//! loads at runtime. The plan is handed to an external compiler/linker
//! driver; nothing here invokes one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::core::Visibility;
use crate::resolver::graph::DependencyGraph;
use crate::resolver::order::BuildOrder;
use crate::resolver::visibility::EffectiveIncludes;

/// A complete build plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    /// Modules in build order (dependencies first)
    pub modules: Vec<PlannedModule>,
}

/// One module in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedModule {
    /// Module name
    pub name: String,

    /// Include directories, own paths first
    pub include_paths: Vec<IncludeEntry>,

    /// Modules linked at build time
    pub link: Vec<LinkEntry>,

    /// Modules loaded at runtime
    #[serde(default)]
    pub dynamic: Vec<String>,
}

/// An include directory and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeEntry {
    /// Path as declared in the origin manifest
    pub path: String,
    /// Resolved physical location
    pub location: PathBuf,
    /// Module that declared the path
    pub origin: String,
}

/// A static link dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub name: String,
    /// Public dependency, re-exported to this module's dependents
    pub reexport: bool,
    /// Provided outside this build
    #[serde(default)]
    pub external: bool,
    /// Reached through a dependency's re-exports, not declared directly
    #[serde(default)]
    pub inherited: bool,
}

impl BuildPlan {
    /// Assemble the plan from the ordered graph and propagated includes.
    pub fn emit(
        graph: &DependencyGraph,
        order: &BuildOrder,
        includes: &HashMap<NodeIndex, EffectiveIncludes>,
    ) -> Self {
        let modules = order
            .iter()
            .map(|node| PlannedModule::emit(graph, node, includes.get(&node)))
            .collect::<Vec<_>>();

        tracing::debug!("Emitted build plan with {} modules", modules.len());

        BuildPlan { modules }
    }

    /// Module names in build order.
    pub fn order(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }

    /// Get a planned module by name.
    pub fn module(&self, name: &str) -> Option<&PlannedModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Position of a module in the build order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.name == name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize build plan")
    }

    /// Write the plan as JSON to a file.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write build plan: {}", path.display()))
    }
}

impl PlannedModule {
    fn emit(
        graph: &DependencyGraph,
        node: NodeIndex,
        includes: Option<&EffectiveIncludes>,
    ) -> Self {
        let include_paths = includes
            .map(|effective| {
                effective
                    .includes
                    .iter()
                    .map(|include| IncludeEntry {
                        path: include.path.clone(),
                        location: include.location.clone(),
                        origin: include.origin.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut link = Vec::new();
        let mut dynamic = Vec::new();

        // deps() is sorted by name, so the dynamic list comes out sorted
        for (dep, visibility) in graph.deps(node, |_| true) {
            let name = graph.name(dep).to_string();
            match visibility {
                Visibility::Dynamic => dynamic.push(name),
                Visibility::Public | Visibility::Private => link.push(LinkEntry {
                    name,
                    reexport: visibility.is_public(),
                    external: graph.module(dep).is_external(),
                    inherited: false,
                }),
            }
        }

        if let Some(effective) = includes {
            for name in &effective.inherited {
                let external = graph
                    .node(name)
                    .is_some_and(|dep| graph.module(dep).is_external());
                link.push(LinkEntry {
                    name: name.clone(),
                    reexport: effective.reexports(name),
                    external,
                    inherited: true,
                });
            }
        }
        link.sort_by(|a, b| a.name.cmp(&b.name));

        PlannedModule {
            name: graph.name(node).to_string(),
            include_paths,
            link,
            dynamic,
        }
    }

    /// Resolved include directories, in order.
    pub fn include_dirs(&self) -> impl Iterator<Item = &Path> {
        self.include_paths.iter().map(|entry| entry.location.as_path())
    }

    /// Convert include directories to compiler flags.
    pub fn to_flags(&self) -> Vec<String> {
        self.include_dirs()
            .map(|dir| format!("-I{}", dir.display()))
            .collect()
    }

    /// Names of link dependencies re-exported to dependents.
    pub fn reexports(&self) -> impl Iterator<Item = &str> {
        self.link
            .iter()
            .filter(|entry| entry.reexport)
            .map(|entry| entry.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Manifest, Registry};
    use crate::resolver::visibility::propagate;

    fn plan(registry: &Registry) -> BuildPlan {
        let graph = DependencyGraph::build(&registry.snapshot().unwrap()).unwrap();
        let order = BuildOrder::compute(&graph).unwrap();
        let includes = propagate(&graph, &order, false).unwrap();
        BuildPlan::emit(&graph, &order, &includes)
    }

    #[test]
    fn test_link_and_dynamic_sets() {
        let registry = Registry::new();
        for manifest in [
            Manifest::builder("Core").include_paths(["Core/Public"]).build(),
            Manifest::builder("Engine")
                .include_paths(["Engine/Public"])
                .public_deps(["Core"])
                .private_deps(["zlib"])
                .build(),
            Manifest::builder("Editor")
                .private_deps(["Engine"])
                .dynamic_deps(["AssetRegistry"])
                .build(),
            Manifest::builder("AssetRegistry").build(),
        ] {
            registry.register(manifest.unwrap()).unwrap();
        }
        registry.declare_external("zlib");

        let plan = plan(&registry);
        assert_eq!(plan.order(), ["AssetRegistry", "Core", "Engine", "Editor"]);

        let engine = plan.module("Engine").unwrap();
        assert_eq!(
            engine.link,
            vec![
                LinkEntry {
                    name: "Core".to_string(),
                    reexport: true,
                    external: false,
                    inherited: false,
                },
                LinkEntry {
                    name: "zlib".to_string(),
                    reexport: false,
                    external: true,
                    inherited: false,
                },
            ]
        );
        assert_eq!(engine.reexports().collect::<Vec<_>>(), ["Core"]);

        let editor = plan.module("Editor").unwrap();
        assert_eq!(editor.dynamic, ["AssetRegistry"]);
        assert_eq!(
            editor.link,
            vec![
                LinkEntry {
                    name: "Core".to_string(),
                    reexport: false,
                    external: false,
                    inherited: true,
                },
                LinkEntry {
                    name: "Engine".to_string(),
                    reexport: false,
                    external: false,
                    inherited: false,
                },
            ]
        );
        assert_eq!(editor.to_flags(), ["-ICore/Public", "-IEngine/Public"]);
    }

    #[test]
    fn test_inherited_link_through_public_chain() {
        // Game -private-> Engine -public-> Core, Launcher -public-> Game
        let registry = Registry::new();
        for manifest in [
            Manifest::builder("Core").build(),
            Manifest::builder("Engine").public_deps(["Core"]).build(),
            Manifest::builder("Game").private_deps(["Engine"]).build(),
            Manifest::builder("Launcher").public_deps(["Game"]).build(),
        ] {
            registry.register(manifest.unwrap()).unwrap();
        }

        let plan = plan(&registry);

        let game = plan.module("Game").unwrap();
        let names: Vec<_> = game.link.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, ["Core", "Engine"]);
        assert!(game.link[0].inherited);
        assert_eq!(game.reexports().count(), 0);

        // Game keeps Engine private, so Core stops there
        let launcher = plan.module("Launcher").unwrap();
        let names: Vec<_> = launcher.link.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, ["Game"]);
    }

    #[test]
    fn test_plan_json_shape() {
        let registry = Registry::new();
        registry
            .register(
                Manifest::builder("Core")
                    .include_paths(["Public"])
                    .root("/src/Core")
                    .build()
                    .unwrap(),
            )
            .unwrap();

        let plan = plan(&registry);
        let json: serde_json::Value = serde_json::from_str(&plan.to_json().unwrap()).unwrap();

        let core = &json["modules"][0];
        assert_eq!(core["name"], "Core");
        assert_eq!(core["include_paths"][0]["path"], "Public");
        assert_eq!(core["include_paths"][0]["origin"], "Core");
        assert!(core["link"].as_array().unwrap().is_empty());

        let parsed: BuildPlan = serde_json::from_str(&plan.to_json().unwrap()).unwrap();
        assert_eq!(parsed, plan);
    }

    #[test]
    fn test_write_json() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("plan.json");

        let registry = Registry::new();
        registry
            .register(Manifest::builder("Core").build().unwrap())
            .unwrap();

        plan(&registry).write_json(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"name\": \"Core\""));
    }
}
