//! Module manifest model.
//!
//! A manifest declares one module: its name, the include directories it
//! exports and uses internally, and its public, private and dynamic
//! dependencies. Manifests are validated on construction and immutable
//! afterwards.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::core::dependency::{Dependency, Visibility};
use crate::resolver::errors::ResolveError;

/// A validated module declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    name: String,

    /// Include directories exported to dependents (declaration order)
    include_paths: Vec<String>,

    /// Include directories used only when compiling this module
    private_include_paths: Vec<String>,

    public_deps: BTreeSet<String>,
    private_deps: BTreeSet<String>,
    dynamic_deps: BTreeSet<String>,

    /// Directory relative include paths are resolved against
    root: Option<PathBuf>,
}

impl Manifest {
    /// Construct a manifest from its declared parts.
    ///
    /// Fails with `InvalidManifest` when the name is empty, a dependency
    /// name is empty, or a module is listed under more than one visibility.
    pub fn load(
        name: impl Into<String>,
        include_paths: Vec<String>,
        public_deps: Vec<String>,
        private_deps: Vec<String>,
        dynamic_deps: Vec<String>,
    ) -> Result<Self, ResolveError> {
        ManifestBuilder::new(name)
            .include_paths(include_paths)
            .public_deps(public_deps)
            .private_deps(private_deps)
            .dynamic_deps(dynamic_deps)
            .build()
    }

    /// Start building a manifest with optional parts.
    pub fn builder(name: impl Into<String>) -> ManifestBuilder {
        ManifestBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exported include paths, in declaration order.
    pub fn include_paths(&self) -> &[String] {
        &self.include_paths
    }

    /// Include paths private to this module, in declaration order.
    pub fn private_include_paths(&self) -> &[String] {
        &self.private_include_paths
    }

    /// Dependency names declared with the given visibility, sorted.
    pub fn deps(&self, visibility: Visibility) -> &BTreeSet<String> {
        match visibility {
            Visibility::Public => &self.public_deps,
            Visibility::Private => &self.private_deps,
            Visibility::Dynamic => &self.dynamic_deps,
        }
    }

    /// All dependencies: public, then private, then dynamic, each sorted by name.
    pub fn dependencies(&self) -> impl Iterator<Item = Dependency> + '_ {
        Visibility::ALL.into_iter().flat_map(move |visibility| {
            self.deps(visibility)
                .iter()
                .map(move |name| Dependency::new(name.as_str(), visibility))
        })
    }

    /// The visibility under which `name` is declared, if at all.
    pub fn visibility_of(&self, name: &str) -> Option<Visibility> {
        Visibility::ALL
            .into_iter()
            .find(|&visibility| self.deps(visibility).contains(name))
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Physical location of an include path declared by this module.
    ///
    /// Absolute paths are returned as-is; relative paths are joined onto the
    /// manifest root when there is one.
    pub fn locate(&self, include: &str) -> PathBuf {
        let path = Path::new(include);
        match &self.root {
            Some(root) if !path.is_absolute() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// Builder for [`Manifest`].
#[derive(Debug, Clone, Default)]
pub struct ManifestBuilder {
    name: String,
    include_paths: Vec<String>,
    private_include_paths: Vec<String>,
    public_deps: Vec<String>,
    private_deps: Vec<String>,
    dynamic_deps: Vec<String>,
    root: Option<PathBuf>,
}

impl ManifestBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        ManifestBuilder {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn include_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn private_include_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.private_include_paths
            .extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn public_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_deps.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn private_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.private_deps.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn dynamic_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dynamic_deps.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Set the directory relative include paths are resolved against.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Validate and freeze the manifest.
    pub fn build(self) -> Result<Manifest, ResolveError> {
        let invalid = |reason: String| ResolveError::InvalidManifest {
            module: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("module name is empty".to_string()));
        }

        let lists = [
            (Visibility::Public, &self.public_deps),
            (Visibility::Private, &self.private_deps),
            (Visibility::Dynamic, &self.dynamic_deps),
        ];

        for (visibility, deps) in lists {
            if deps.iter().any(|dep| dep.trim().is_empty()) {
                return Err(invalid(format!("empty name in {} dependencies", visibility)));
            }
        }

        // Each dependency gets exactly one visibility
        for (i, (first_vis, first)) in lists.iter().enumerate() {
            for (second_vis, second) in &lists[i + 1..] {
                if let Some(dup) = first.iter().find(|dep| second.contains(dep)) {
                    return Err(invalid(format!(
                        "`{}` is listed as both a {} and a {} dependency",
                        dup, first_vis, second_vis
                    )));
                }
            }
        }

        Ok(Manifest {
            public_deps: self.public_deps.iter().cloned().collect(),
            private_deps: self.private_deps.iter().cloned().collect(),
            dynamic_deps: self.dynamic_deps.iter().cloned().collect(),
            name: self.name,
            include_paths: self.include_paths,
            private_include_paths: self.private_include_paths,
            root: self.root,
        })
    }
}
