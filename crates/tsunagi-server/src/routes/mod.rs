//! Skill API Routes
//!
//! - /skills/workspace/resolve - Workspace resolution
//! - /skills/memory/* - Memory log (add, patch, disable, enable, search, important, list)

pub mod memory;
pub mod swagger;
pub mod workspace;

use tsunagi::WorkspaceInfo;

use crate::error::{api_error, ApiError};
use crate::models::WorkspaceRef;
use crate::AppState;

/// Resolve (creating if needed) the workspace a skill call addresses
pub(crate) async fn resolve(state: &AppState, workspace: &WorkspaceRef) -> Result<WorkspaceInfo, ApiError> {
    let components = workspace.components()?;
    state
        .workspaces
        .get_or_create(components, workspace.is_dm)
        .await
        .map_err(api_error)
}
