//! Platform - Chat platforms the bridge accepts events from

use serde::{Deserialize, Serialize};

/// Supported chat platform
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Discord,
    Misskey,
}

impl Platform {
    /// All platforms, in directory-listing order
    pub const ALL: [Platform; 2] = [Platform::Discord, Platform::Misskey];

    /// Lowercase name, also used as the top-level workspace directory
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Discord => "discord",
            Platform::Misskey => "misskey",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "discord" => Ok(Platform::Discord),
            "misskey" => Ok(Platform::Misskey),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}
