//! Configuration file support for modgraph.
//!
//! Two configuration file locations are read:
//! - Global: `~/.modgraph/config.toml` - User-wide defaults
//! - Project: `<root>/.modgraph/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Externals from both
//! files accumulate.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ops::resolve::ResolveOptions;

/// modgraph configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resolution settings
    pub resolve: ResolveConfig,
}

/// Resolution settings from the `[resolve]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Reject include paths that resolve to two different directories
    pub strict: Option<bool>,

    /// Modules provided outside the manifest tree
    pub externals: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.resolve.strict.is_some() {
            self.resolve.strict = other.resolve.strict;
        }
        for name in other.resolve.externals {
            if !self.resolve.externals.contains(&name) {
                self.resolve.externals.push(name);
            }
        }
    }

    /// Resolution options this config selects.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            strict: self.resolve.strict.unwrap_or(false),
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.modgraph/config.toml)
/// 2. Global config (~/.modgraph/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));
    config
}

/// Get the global modgraph config directory (~/.modgraph).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".modgraph"))
}

/// Get the global config path (~/.modgraph/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (<root>/.modgraph/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".modgraph").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("home/.modgraph/config.toml");
        let project = project_config_path(&tmp.path().join("project"));

        write(&global, "[resolve]\nstrict = true\nexternals = [\"zlib\"]\n");
        write(&project, "[resolve]\nstrict = false\nexternals = [\"openssl\", \"zlib\"]\n");

        let config = load_config(Some(global.as_path()), &project);
        assert_eq!(config.resolve.strict, Some(false));
        assert_eq!(config.resolve.externals, ["zlib", "openssl"]);
        assert!(!config.resolve_options().strict);
    }

    #[test]
    fn test_unset_strict_keeps_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = project_config_path(tmp.path());

        write(&global, "[resolve]\nstrict = true\n");
        write(&project, "[resolve]\nexternals = [\"zlib\"]\n");

        let config = load_config(Some(global.as_path()), &project);
        assert!(config.resolve_options().strict);
        assert_eq!(config.resolve.externals, ["zlib"]);
    }

    #[test]
    fn test_missing_and_broken_files_use_defaults() {
        let tmp = TempDir::new().unwrap();
        let project = project_config_path(tmp.path());
        assert_eq!(load_config(None, &project), Config::default());

        write(&project, "[resolve\n");
        assert_eq!(Config::load_or_default(&project), Config::default());
        assert!(Config::load(&project).is_err());
    }
}
