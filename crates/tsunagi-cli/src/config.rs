//! Configuration management for Tsunagi CLI
//!
//! Stores the bridge settings in ~/.config/tsunagi/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tsunagi::BridgeConfig;

const CONFIG_DIR: &str = "tsunagi";
const CONFIG_FILE: &str = "config.toml";

/// CLI Configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bridge: BridgeConfig,
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join(CONFIG_DIR);
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config file")
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory {:?}", dir))?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// Workspaces root, with `--root` taking precedence over the file
    pub fn workspaces_root(&self, root_override: Option<&Path>) -> PathBuf {
        match root_override {
            Some(root) => root.to_path_buf(),
            None => self.bridge.workspaces_root(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_bridge_table() {
        let config = Config::parse(
            r#"
            [bridge]
            repo_root = "/srv/tsunagi"

            [bridge.memory]
            search_limit = 3
            "#,
        )
        .unwrap();

        assert_eq!(
            config.workspaces_root(None),
            PathBuf::from("/srv/tsunagi/workspaces")
        );
        assert_eq!(config.bridge.memory.search_limit, 3);
        assert_eq!(config.bridge.memory.max_search_chars, 8000);
        assert!(config.bridge.search.fast_path);
    }

    #[test]
    fn test_empty_file_and_override() {
        let config = Config::parse("").unwrap();
        assert_eq!(
            config.workspaces_root(Some(Path::new("/tmp/ws"))),
            PathBuf::from("/tmp/ws")
        );
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::load_from(&temp.path().join("none.toml")).unwrap();
        assert_eq!(config.bridge.workspaces_dir, "workspaces");
    }
}
