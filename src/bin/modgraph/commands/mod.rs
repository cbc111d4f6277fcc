//! Command implementations

pub mod check;
pub mod includes;
pub mod order;
pub mod plan;
pub mod tree;

use anyhow::{Context, Result};

use crate::cli::SourceArgs;
use modgraph::ops::load_registry;
use modgraph::util::config::{global_config_path, load_config, project_config_path};
use modgraph::util::diagnostic::{self, suggestions, Diagnostic};
use modgraph::{Registry, ResolveOptions};

/// Load every manifest under the source directory.
///
/// Command-line flags win over configuration files; externals from both
/// are combined.
pub fn open_registry(source: &SourceArgs) -> Result<(Registry, ResolveOptions)> {
    let root = match &source.path {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("failed to determine current directory")?,
    };

    let config = load_config(
        global_config_path().as_deref(),
        &project_config_path(&root),
    );

    let mut externals = config.resolve.externals.clone();
    for name in &source.externals {
        if !externals.contains(name) {
            externals.push(name.clone());
        }
    }

    let mut options = config.resolve_options();
    options.strict |= source.strict;

    let registry = load_registry(&root, &externals)?;
    if registry.is_empty() {
        diagnostic::emit(
            &Diagnostic::warning(format!("no module manifests found in {}", root.display()))
                .with_suggestion(suggestions::NO_MANIFESTS),
            false,
        );
    }

    Ok((registry, options))
}
