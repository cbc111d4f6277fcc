//! Shared fixtures for unit tests.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{Manifest, Registry};

/// Register every manifest into a fresh registry.
pub fn registry_of(manifests: Vec<Manifest>) -> Registry {
    let registry = Registry::new();
    for manifest in manifests {
        registry.register(manifest).unwrap();
    }
    registry
}

/// Core, Engine (public -> Core), Editor (private -> Engine,
/// dynamic -> AssetRegistry) and AssetRegistry.
pub fn editor_modules() -> Vec<Manifest> {
    vec![
        Manifest::builder("Core")
            .include_paths(["Runtime/Core/Public"])
            .build()
            .unwrap(),
        Manifest::builder("Engine")
            .include_paths(["Runtime/Engine/Public"])
            .private_include_paths(["Runtime/Engine/Private"])
            .public_deps(["Core"])
            .build()
            .unwrap(),
        Manifest::builder("Editor")
            .include_paths(["Editor/Public"])
            .private_deps(["Engine"])
            .dynamic_deps(["AssetRegistry"])
            .build()
            .unwrap(),
        Manifest::builder("AssetRegistry")
            .include_paths(["Runtime/AssetRegistry/Public"])
            .build()
            .unwrap(),
    ]
}

/// Write `<dir>/<name>/<name>.module.toml` with the given body.
pub fn write_manifest(dir: &Path, name: &str, body: &str) -> PathBuf {
    let module_dir = dir.join(name);
    fs::create_dir_all(&module_dir).unwrap();

    let path = module_dir.join(format!("{}.module.toml", name));
    fs::write(&path, format!("name = \"{}\"\n{}", name, body)).unwrap();
    path
}
