//! Visibility - Which memory log a memory belongs to

use serde::{Deserialize, Serialize};

/// Memory visibility
///
/// Also selects the log file: `memory.public.jsonl` or `memory.private.jsonl`.
/// Private logs only exist for direct-message workspaces.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }

    /// File name of the memory log for this visibility
    pub fn file_name(&self) -> &'static str {
        match self {
            Visibility::Public => "memory.public.jsonl",
            Visibility::Private => "memory.private.jsonl",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            _ => Err(format!("Unknown visibility: {}", s)),
        }
    }
}
