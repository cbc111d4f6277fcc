//! Resolution error types and diagnostics.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::Visibility;
use crate::util::diagnostic::Diagnostic;

/// A dependency reference that names neither a registered nor an external module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct UnresolvedRef {
    /// Module declaring the dependency
    pub module: String,
    /// The missing reference
    pub dependency: String,
    /// How the dependency was declared
    pub visibility: Visibility,
}

impl UnresolvedRef {
    pub fn new(
        module: impl Into<String>,
        dependency: impl Into<String>,
        visibility: Visibility,
    ) -> Self {
        UnresolvedRef {
            module: module.into(),
            dependency: dependency.into(),
            visibility,
        }
    }
}

impl fmt::Display for UnresolvedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` -> `{}` ({})",
            self.module, self.dependency, self.visibility
        )
    }
}

fn join_unresolved(unresolved: &[UnresolvedRef]) -> String {
    unresolved
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error during module resolution.
///
/// Every variant is fatal to the resolution run. Callers fix the manifest
/// set and resolve again.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ResolveError {
    #[error("invalid manifest for `{module}`: {reason}")]
    #[diagnostic(code(modgraph::manifest::invalid))]
    InvalidManifest { module: String, reason: String },

    #[error("module `{module}` is registered more than once")]
    #[diagnostic(
        code(modgraph::registry::duplicate),
        help("Each module name must be declared by exactly one manifest")
    )]
    DuplicateModule { module: String },

    #[error("unresolved dependencies: {}", join_unresolved(.unresolved))]
    #[diagnostic(
        code(modgraph::registry::unresolved),
        help("Register the missing modules or declare them as external")
    )]
    UnresolvedDependency { unresolved: Vec<UnresolvedRef> },

    #[error("module `{module}` depends on itself")]
    #[diagnostic(code(modgraph::graph::self_dependency))]
    SelfDependency { module: String },

    #[error("cyclic dependency: {}", .cycle.join(" -> "))]
    #[diagnostic(
        code(modgraph::graph::cycle),
        help("Break the cycle by making one edge dynamic or restructuring the modules")
    )]
    CyclicDependency { cycle: Vec<String> },

    #[error(
        "include path `{include}` in `{module}` is ambiguous: `{path_a}` vs `{path_b}`"
    )]
    #[diagnostic(code(modgraph::visibility::conflict))]
    VisibilityConflict {
        module: String,
        include: String,
        path_a: String,
        path_b: String,
    },

    #[error("registry is not finalized: {pending} manifest load(s) still outstanding")]
    #[diagnostic(
        code(modgraph::registry::not_finalized),
        help("Join every manifest loader before resolving")
    )]
    RegistryNotFinalized { pending: usize },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::InvalidManifest { module, reason } => {
                let name = if module.is_empty() { "<unnamed>" } else { module };
                Diagnostic::error(format!("invalid manifest for `{}`", name))
                    .with_context(reason.clone())
                    .with_suggestion(
                        "Give every module a name and list each dependency under one visibility",
                    )
            }

            ResolveError::DuplicateModule { module } => {
                Diagnostic::error(format!("module `{}` is declared more than once", module))
                    .with_suggestion(format!(
                        "Remove or rename one of the `{}` manifests",
                        module
                    ))
            }

            ResolveError::UnresolvedDependency { unresolved } => {
                let mut diag = Diagnostic::error(format!(
                    "{} unresolved dependenc{}",
                    unresolved.len(),
                    if unresolved.len() == 1 { "y" } else { "ies" }
                ));

                for missing in unresolved {
                    diag = diag.with_context(format!(
                        "`{}` declares {} dependency on `{}`",
                        missing.module, missing.visibility, missing.dependency
                    ));
                }

                diag.with_suggestion("Add a manifest for each missing module")
                    .with_suggestion("Declare modules built elsewhere with `--external <name>`")
            }

            ResolveError::SelfDependency { module } => {
                Diagnostic::error(format!("module `{}` depends on itself", module))
                    .with_suggestion(format!(
                        "Remove `{}` from its own dependency lists",
                        module
                    ))
            }

            ResolveError::CyclicDependency { cycle } => {
                Diagnostic::error("cycle detected in static dependency graph")
                    .with_context(format!("cycle: {}", cycle.join(" -> ")))
                    .with_suggestion(
                        "Break the cycle by removing or restructuring dependencies",
                    )
                    .with_suggestion("Load one side at runtime as a dynamic dependency")
            }

            ResolveError::VisibilityConflict {
                module,
                include,
                path_a,
                path_b,
            } => Diagnostic::error(format!(
                "ambiguous include path `{}` while compiling `{}`",
                include, module
            ))
            .with_context(format!("resolves to {}", path_a))
            .with_context(format!("and also to {}", path_b))
            .with_suggestion("Give the exported include directories distinct names")
            .with_suggestion("Resolve without `--strict` to keep both locations"),

            ResolveError::RegistryNotFinalized { pending } => Diagnostic::error(
                "resolution started while manifests were still loading",
            )
            .with_context(format!("{} load(s) outstanding", pending)),
        }
    }
}
