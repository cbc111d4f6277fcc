//! Module registry.
//!
//! The registry is filled during a loading phase, possibly by several
//! loaders running in parallel, and then frozen into an immutable
//! [`RegistrySnapshot`] for resolution. Each loader holds a [`LoadGuard`]
//! while it works; a snapshot cannot be taken while any guard is alive.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::Manifest;
use crate::resolver::errors::{ResolveError, UnresolvedRef};

#[derive(Debug, Default)]
struct RegistryState {
    modules: BTreeMap<String, Manifest>,
    externals: BTreeSet<String>,
}

/// The set of known modules, keyed by name.
///
/// Registration goes through `&self`, so a registry can be shared between
/// loader threads.
#[derive(Debug, Default)]
pub struct Registry {
    state: Mutex<RegistryState>,
    pending: Arc<AtomicUsize>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Registry::default()
    }

    /// Register a manifest.
    pub fn register(&self, manifest: Manifest) -> Result<(), ResolveError> {
        let mut state = self.state.lock();

        if state.modules.contains_key(manifest.name()) {
            return Err(ResolveError::DuplicateModule {
                module: manifest.name().to_string(),
            });
        }

        tracing::debug!("Registered module {}", manifest.name());
        state.modules.insert(manifest.name().to_string(), manifest);
        Ok(())
    }

    /// Declare a module that is resolvable outside this build.
    pub fn declare_external(&self, name: impl Into<String>) {
        self.state.lock().externals.insert(name.into());
    }

    /// Mark the start of a manifest load.
    ///
    /// The load counts as outstanding until the returned guard is dropped.
    pub fn begin_load(&self) -> LoadGuard {
        // Counted under the lock so a snapshot never sees a half-started load
        let _state = self.state.lock();
        self.pending.fetch_add(1, Ordering::SeqCst);
        LoadGuard {
            pending: Arc::clone(&self.pending),
        }
    }

    /// Number of loads that have started but not finished.
    pub fn pending_loads(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Check if a module with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.state.lock().modules.contains_key(name)
    }

    /// Get the number of registered modules.
    pub fn len(&self) -> usize {
        self.state.lock().modules.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.state.lock().modules.is_empty()
    }

    /// Freeze the current contents for resolution.
    ///
    /// Fails with `RegistryNotFinalized` while loads are outstanding.
    pub fn snapshot(&self) -> Result<RegistrySnapshot, ResolveError> {
        let state = self.state.lock();

        let pending = self.pending_loads();
        if pending > 0 {
            return Err(ResolveError::RegistryNotFinalized { pending });
        }

        Ok(RegistrySnapshot {
            modules: state.modules.clone(),
            externals: state.externals.clone(),
        })
    }

    /// Validate the registry contents. See [`RegistrySnapshot::validate`].
    pub fn validate(&self) -> Result<(), ResolveError> {
        self.snapshot()?.validate()
    }
}

/// Marks one in-flight manifest load.
#[derive(Debug)]
#[must_use = "the load is finished as soon as the guard is dropped"]
pub struct LoadGuard {
    pending: Arc<AtomicUsize>,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }
}

/// An immutable view of a registry, taken after loading finished.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    modules: BTreeMap<String, Manifest>,
    externals: BTreeSet<String>,
}

impl RegistrySnapshot {
    /// Get a manifest by module name.
    pub fn get(&self, name: &str) -> Option<&Manifest> {
        self.modules.get(name)
    }

    /// Iterate over manifests, sorted by module name.
    pub fn manifests(&self) -> impl Iterator<Item = &Manifest> {
        self.modules.values()
    }

    /// Names declared external and not registered, sorted.
    pub fn externals(&self) -> impl Iterator<Item = &str> {
        self.externals
            .iter()
            .filter(|name| !self.modules.contains_key(name.as_str()))
            .map(String::as_str)
    }

    /// Check if a name is declared external (and not registered).
    pub fn is_external(&self, name: &str) -> bool {
        self.externals.contains(name) && !self.modules.contains_key(name)
    }

    /// Check if a reference resolves to a registered or external module.
    pub fn resolves(&self, name: &str) -> bool {
        self.modules.contains_key(name) || self.externals.contains(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Confirm every dependency reference resolves.
    ///
    /// All unresolved references are collected and reported together,
    /// sorted by declaring module and then by reference.
    pub fn validate(&self) -> Result<(), ResolveError> {
        let unresolved: Vec<UnresolvedRef> = self
            .manifests()
            .flat_map(|manifest| {
                manifest
                    .dependencies()
                    .filter(|dep| !self.resolves(dep.name()))
                    .map(|dep| UnresolvedRef::new(manifest.name(), dep.name(), dep.visibility()))
                    .collect::<Vec<_>>()
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if unresolved.is_empty() {
            tracing::debug!("Validated {} modules", self.len());
            Ok(())
        } else {
            Err(ResolveError::UnresolvedDependency { unresolved })
        }
    }
}
