//! Dependency references and their visibility.
//!
//! A module declares each dependency with exactly one visibility. Public and
//! private dependencies are static: they constrain build order and feed the
//! compile/link surface. Dynamic dependencies are only loaded at runtime.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Visibility of a declared dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Interface is re-exported to the declaring module's dependents
    Public,
    /// Visible to the declaring module only
    Private,
    /// Loaded at runtime, never part of build order
    Dynamic,
}

impl Visibility {
    /// All visibilities, in declaration order.
    pub const ALL: [Visibility; 3] = [Visibility::Public, Visibility::Private, Visibility::Dynamic];

    /// Whether this edge kind participates in build ordering.
    pub fn is_static(self) -> bool {
        !matches!(self, Visibility::Dynamic)
    }

    /// Whether the dependency's interface propagates to dependents.
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference from one module to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dependency {
    name: String,
    visibility: Visibility,
}

impl Dependency {
    pub fn new(name: impl Into<String>, visibility: Visibility) -> Self {
        Dependency {
            name: name.into(),
            visibility,
        }
    }

    /// Name of the referenced module.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.visibility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_visibilities() {
        assert!(Visibility::Public.is_static());
        assert!(Visibility::Private.is_static());
        assert!(!Visibility::Dynamic.is_static());
        assert!(Visibility::Public.is_public());
        assert!(!Visibility::Private.is_public());
    }

    #[test]
    fn test_visibility_serde_is_lowercase() {
        let json = serde_json::to_string(&Visibility::Dynamic).unwrap();
        assert_eq!(json, "\"dynamic\"");

        let parsed: Visibility = serde_json::from_str("\"private\"").unwrap();
        assert_eq!(parsed, Visibility::Private);
    }

    #[test]
    fn test_dependency_display() {
        let dep = Dependency::new("Core", Visibility::Public);
        assert_eq!(dep.to_string(), "Core (public)");
    }
}
