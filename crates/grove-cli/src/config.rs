//! Grove configuration.
//!
//! Looked up in `<vault>/.grove/config.json`, then in the user config
//! directory, then defaults. A missing file is fine; a broken one is an
//! error that names the file.

use anyhow::{Context, Result};
use grove_watcher::{LoadOptions, DEFAULT_EXCLUDED_DIRS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory inside the vault holding Grove's own files.
pub const GROVE_DIR: &str = ".grove";

pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroveConfig {
    /// How many hops a context node reaches from its origin.
    pub max_context_distance: usize,
    pub follow_symlinks: bool,
    pub excluded_dirs: Vec<String>,
}

impl Default for GroveConfig {
    fn default() -> Self {
        Self {
            max_context_distance: 7,
            follow_symlinks: false,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl GroveConfig {
    /// Path of the vault-local config file.
    pub fn vault_path(vault: &Path) -> PathBuf {
        vault.join(GROVE_DIR).join(CONFIG_FILE)
    }

    /// Path of the per-user config file, if the platform has one.
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("grove").join(CONFIG_FILE))
    }

    /// Loads the config for `vault`.
    pub fn load(vault: &Path) -> Result<Self> {
        Self::load_from(&Self::vault_path(vault), Self::user_path().as_deref())
    }

    fn load_from(vault_file: &Path, user_file: Option<&Path>) -> Result<Self> {
        for path in std::iter::once(vault_file).chain(user_file) {
            if path.is_file() {
                debug!("Using config {}", path.display());
                return Self::read(path);
            }
        }
        Ok(Self::default())
    }

    fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Writes this config to `path`, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            follow_symlinks: self.follow_symlinks,
            excluded_dirs: self.excluded_dirs.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let config = GroveConfig::load_from(&dir.path().join("none.json"), None).unwrap();
        assert_eq!(config, GroveConfig::default());
        assert_eq!(config.max_context_distance, 7);
    }

    #[test]
    fn test_vault_file_wins() {
        let dir = tempdir().unwrap();
        let vault_file = dir.path().join("vault.json");
        let user_file = dir.path().join("user.json");
        fs::write(&vault_file, r#"{"max_context_distance": 2}"#).unwrap();
        fs::write(&user_file, r#"{"max_context_distance": 9}"#).unwrap();

        let config = GroveConfig::load_from(&vault_file, Some(&user_file)).unwrap();
        assert_eq!(config.max_context_distance, 2);
        assert!(!config.follow_symlinks);
    }

    #[test]
    fn test_user_file_fallback() {
        let dir = tempdir().unwrap();
        let user_file = dir.path().join("user.json");
        fs::write(&user_file, r#"{"follow_symlinks": true}"#).unwrap();

        let config =
            GroveConfig::load_from(&dir.path().join("missing.json"), Some(&user_file)).unwrap();
        assert!(config.follow_symlinks);
        assert_eq!(config.max_context_distance, 7);
    }

    #[test]
    fn test_malformed_names_file() {
        let dir = tempdir().unwrap();
        let vault_file = dir.path().join("broken.json");
        fs::write(&vault_file, "{ nope").unwrap();

        let err = GroveConfig::load_from(&vault_file, None).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_write_round_trip() {
        let dir = tempdir().unwrap();
        let path = GroveConfig::vault_path(dir.path());
        let config = GroveConfig {
            max_context_distance: 3,
            ..GroveConfig::default()
        };

        config.write(&path).unwrap();

        assert_eq!(GroveConfig::load_from(&path, None).unwrap(), config);
    }
}
