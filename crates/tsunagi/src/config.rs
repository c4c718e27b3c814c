//! Core configuration
//!
//! Every field has a default so partial TOML tables and empty environments
//! both produce a usable config.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Bridge core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Repository root the workspaces directory is resolved against
    #[serde(default = "default_repo_root")]
    pub repo_root: PathBuf,
    /// Directory (relative to `repo_root`) holding all workspaces
    #[serde(default = "default_workspaces_dir")]
    pub workspaces_dir: String,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub reply: ReplyConfig,
}

impl BridgeConfig {
    /// `<repo_root>/<workspaces_dir>`
    pub fn workspaces_root(&self) -> PathBuf {
        self.repo_root.join(&self.workspaces_dir)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            repo_root: default_repo_root(),
            workspaces_dir: default_workspaces_dir(),
            memory: MemoryConfig::default(),
            search: SearchConfig::default(),
            reply: ReplyConfig::default(),
        }
    }
}

fn default_repo_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_workspaces_dir() -> String {
    "workspaces".to_string()
}

/// Memory recall limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum memories returned by a search
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    /// Character budget for the content of memories returned by a search
    #[serde(default = "default_max_search_chars")]
    pub max_search_chars: usize,
}

fn default_search_limit() -> usize {
    10
}

fn default_max_search_chars() -> usize {
    8000
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            search_limit: default_search_limit(),
            max_search_chars: default_max_search_chars(),
        }
    }
}

/// Keyword search fast path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Try ripgrep before scanning in process
    #[serde(default = "default_fast_path")]
    pub fast_path: bool,
    #[serde(default = "default_ripgrep_bin")]
    pub ripgrep_bin: String,
}

fn default_fast_path() -> bool {
    true
}

fn default_ripgrep_bin() -> String {
    "rg".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fast_path: default_fast_path(),
            ripgrep_bin: default_ripgrep_bin(),
        }
    }
}

/// Fallback error reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    #[serde(default = "default_error_message")]
    pub error_message: String,
}

fn default_error_message() -> String {
    "Sorry, something went wrong while handling your message. Please try again in a moment."
        .to_string()
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            error_message: default_error_message(),
        }
    }
}
