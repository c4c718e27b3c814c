//! Importance - Whether a memory is always pulled into context

use serde::{Deserialize, Serialize};

/// Memory importance
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    /// Always included in assembled context
    High,
    #[default]
    Normal,
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Importance::High => write!(f, "high"),
            Importance::Normal => write!(f, "normal"),
        }
    }
}

impl std::str::FromStr for Importance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Importance::High),
            "normal" => Ok(Importance::Normal),
            _ => Err(format!("Unknown importance: {}", s)),
        }
    }
}
