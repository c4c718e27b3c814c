//! Workspace addressing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tsunagi::{Platform, WorkspaceInfo, WorkspaceKeyComponents};
use utoipa::ToSchema;

use crate::error::{bad_request, ApiError};

/// The conversation a skill call acts on
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WorkspaceRef {
    /// `discord` or `misskey`
    #[schema(example = "discord")]
    pub platform: String,
    pub user_id: String,
    pub channel_id: String,
    #[serde(default)]
    pub is_dm: bool,
}

impl WorkspaceRef {
    pub fn components(&self) -> Result<WorkspaceKeyComponents, ApiError> {
        let platform: Platform = self.platform.parse().map_err(bad_request)?;
        if self.user_id.is_empty() || self.channel_id.is_empty() {
            return Err(bad_request("user_id and channel_id are required"));
        }
        Ok(WorkspaceKeyComponents::new(
            platform,
            self.user_id.clone(),
            self.channel_id.clone(),
        ))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveWorkspaceRequest {
    pub workspace: WorkspaceRef,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkspaceResponse {
    #[schema(example = "discord/1234/5678")]
    pub key: String,
    pub path: String,
    pub is_dm: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<WorkspaceInfo> for WorkspaceResponse {
    fn from(info: WorkspaceInfo) -> Self {
        Self {
            key: info.key,
            path: info.path.display().to_string(),
            is_dm: info.is_dm,
            created_at: info.created_at,
        }
    }
}
