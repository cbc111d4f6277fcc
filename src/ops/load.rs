//! Manifest file loading.
//!
//! Module manifests live in `*.module.toml` files:
//!
//! ```toml
//! name = "Engine"
//! include_paths = ["Public"]
//! private_include_paths = ["Private"]
//! public_dependencies = ["Core"]
//! private_dependencies = ["Json"]
//! dynamic_dependencies = ["AssetRegistry"]
//! ```
//!
//! Relative include paths resolve against the directory holding the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use walkdir::WalkDir;

use crate::core::{LoadGuard, Manifest, Registry};

/// File name suffix identifying module manifests.
pub const MANIFEST_SUFFIX: &str = ".module.toml";

/// On-disk form of a module manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestFile {
    pub name: String,

    #[serde(default)]
    pub include_paths: Vec<String>,

    #[serde(default)]
    pub private_include_paths: Vec<String>,

    #[serde(default)]
    pub public_dependencies: Vec<String>,

    #[serde(default)]
    pub private_dependencies: Vec<String>,

    #[serde(default)]
    pub dynamic_dependencies: Vec<String>,
}

impl ManifestFile {
    /// Parse a manifest from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse module manifest")
    }

    /// Convert into a validated manifest rooted at `root`.
    pub fn into_manifest(self, root: Option<&Path>) -> Result<Manifest> {
        let mut builder = Manifest::builder(self.name)
            .include_paths(self.include_paths)
            .private_include_paths(self.private_include_paths)
            .public_deps(self.public_dependencies)
            .private_deps(self.private_dependencies)
            .dynamic_deps(self.dynamic_dependencies);

        if let Some(root) = root {
            builder = builder.root(root);
        }

        Ok(builder.build()?)
    }
}

/// Error context naming the manifest file a failure came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("in manifest {}", .path.display())]
pub struct ManifestContext {
    pub path: PathBuf,
}

impl ManifestContext {
    fn new(path: &Path) -> Self {
        ManifestContext {
            path: path.to_path_buf(),
        }
    }
}

/// Load one manifest file.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest: {}", path.display()))?;

    ManifestFile::parse(&contents)
        .and_then(|file| file.into_manifest(path.parent()))
        .with_context(|| ManifestContext::new(path))
}

/// Find every manifest file under `root`, sorted by path.
pub fn discover_manifests(root: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;

        let is_manifest = entry.file_type().is_file()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(MANIFEST_SUFFIX));

        if is_manifest {
            paths.push(entry.into_path());
        }
    }

    paths.sort();
    tracing::debug!("Found {} manifests under {}", paths.len(), root.display());
    Ok(paths)
}

/// Load manifests into `registry`, one parallel loader per file.
///
/// Every loader holds a load guard until its manifest is registered. Files
/// are parsed in parallel and registered in path order, so a duplicate
/// module is always reported against the later file. The first failure (in
/// path order) is reported.
pub fn load_into(registry: &Registry, paths: &[PathBuf]) -> Result<()> {
    let loaded: Vec<(LoadGuard, Result<Manifest>)> = paths
        .par_iter()
        .map(|path| (registry.begin_load(), load_manifest(path)))
        .collect();

    for (path, (guard, manifest)) in paths.iter().zip(loaded) {
        registry
            .register(manifest?)
            .with_context(|| ManifestContext::new(path))?;
        drop(guard);
    }

    tracing::info!("Loaded {} manifests", paths.len());
    Ok(())
}

/// Discover and load every manifest under `root` into a new registry.
pub fn load_registry(root: &Path, externals: &[String]) -> Result<Registry> {
    let registry = Registry::new();
    for name in externals {
        registry.declare_external(name.as_str());
    }

    let paths = discover_manifests(root)?;
    load_into(&registry, &paths)?;
    Ok(registry)
}
