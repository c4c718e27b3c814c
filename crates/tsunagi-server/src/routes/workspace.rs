//! Workspace Routes

use axum::{extract::State, routing::post, Json, Router};

use crate::error::ApiError;
use crate::models::{ResolveWorkspaceRequest, WorkspaceResponse};
use crate::AppState;

/// Resolve the workspace of a conversation, creating it if needed
#[utoipa::path(
    post,
    path = "/skills/workspace/resolve",
    request_body = ResolveWorkspaceRequest,
    responses(
        (status = 200, description = "Workspace resolved", body = WorkspaceResponse),
        (status = 400, description = "Invalid workspace reference"),
        (status = 403, description = "Workspace path escapes the workspaces root")
    ),
    tag = "Workspace"
)]
pub async fn resolve_workspace(
    State(state): State<AppState>,
    Json(payload): Json<ResolveWorkspaceRequest>,
) -> Result<Json<WorkspaceResponse>, ApiError> {
    let workspace = super::resolve(&state, &payload.workspace).await?;
    Ok(Json(workspace.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/skills/workspace/resolve", post(resolve_workspace))
}
