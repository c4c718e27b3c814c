//! Workspace - The trust boundary for one conversation

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Platform;

/// Identifies a workspace: one `(platform, user, channel)` conversation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceKeyComponents {
    pub platform: Platform,
    pub user_id: String,
    pub channel_id: String,
}

impl WorkspaceKeyComponents {
    pub fn new(platform: Platform, user_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            platform,
            user_id: user_id.into(),
            channel_id: channel_id.into(),
        }
    }
}

/// A resolved workspace directory
///
/// Re-derived on every access; never cached across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    /// `platform/userId/channelId`, sanitized
    pub key: String,
    pub components: WorkspaceKeyComponents,
    /// Absolute workspace directory
    pub path: PathBuf,
    /// Direct-message workspaces also carry a private memory log
    pub is_dm: bool,
    /// Best-effort directory creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
