//! Server settings from the environment

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use tsunagi::BridgeConfig;

const DEFAULT_BIND: &str = "127.0.0.1:8787";

/// Everything the skill server reads at startup
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub bridge: BridgeConfig,
    pub bind: SocketAddr,
    /// Bearer token skills must present; `None` disables auth
    pub skill_token: Option<String>,
}

impl ServerSettings {
    /// Load `.env` if present, then read `TSUNAGI_*` variables
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut bridge = BridgeConfig::default();

        if let Some(root) = var("TSUNAGI_REPO_ROOT") {
            bridge.repo_root = PathBuf::from(root);
        }
        if let Some(dir) = var("TSUNAGI_WORKSPACES_DIR") {
            bridge.workspaces_dir = dir;
        }
        if let Some(limit) = var("TSUNAGI_SEARCH_LIMIT") {
            bridge.memory.search_limit = limit
                .parse()
                .with_context(|| format!("TSUNAGI_SEARCH_LIMIT is not a number: {limit}"))?;
        }
        if let Some(flag) = var("TSUNAGI_DISABLE_RIPGREP") {
            bridge.search.fast_path = !matches!(flag.as_str(), "1" | "true" | "yes");
        }

        let bind = var("TSUNAGI_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind
            .parse()
            .with_context(|| format!("TSUNAGI_BIND is not a socket address: {bind}"))?;

        let skill_token = var("TSUNAGI_SKILL_TOKEN").filter(|t| !t.is_empty());

        Ok(Self {
            bridge,
            bind,
            skill_token,
        })
    }
}
