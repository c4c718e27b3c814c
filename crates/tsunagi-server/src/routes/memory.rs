//! Memory Routes - Per-workspace append-only memory log

use axum::{extract::State, routing::post, Json, Router};
use tsunagi::{AddMemoryOptions, Importance, SearchMemoriesOptions, Visibility};

use crate::error::{api_error, ApiError};
use crate::models::{
    parse_opt, AddMemoryRequest, ListMemoriesRequest, MemoryIdRequest, MemoryResponse,
    PatchMemoryRequest, PatchResponse, ResolveWorkspaceRequest, SearchMemoriesRequest,
};
use crate::AppState;

/// Record a new memory
#[utoipa::path(
    post,
    path = "/skills/memory/add",
    request_body = AddMemoryRequest,
    responses(
        (status = 200, description = "Memory added", body = MemoryResponse),
        (status = 400, description = "Empty content, or private memory outside a DM")
    ),
    tag = "Memory"
)]
pub async fn add_memory(
    State(state): State<AppState>,
    Json(payload): Json<AddMemoryRequest>,
) -> Result<Json<MemoryResponse>, ApiError> {
    let workspace = super::resolve(&state, &payload.workspace).await?;
    let options = AddMemoryOptions {
        visibility: parse_opt::<Visibility>(payload.visibility.as_deref())?.unwrap_or_default(),
        importance: parse_opt::<Importance>(payload.importance.as_deref())?.unwrap_or_default(),
    };

    let entry = state
        .memory
        .add_memory(&workspace, &payload.content, options)
        .await
        .map_err(api_error)?;

    Ok(Json(entry.into()))
}

/// Change enabled / visibility / importance of an existing memory
#[utoipa::path(
    post,
    path = "/skills/memory/patch",
    request_body = PatchMemoryRequest,
    responses(
        (status = 200, description = "Patch appended", body = PatchResponse),
        (status = 400, description = "Nothing to change"),
        (status = 404, description = "Unknown memory id")
    ),
    tag = "Memory"
)]
pub async fn patch_memory(
    State(state): State<AppState>,
    Json(payload): Json<PatchMemoryRequest>,
) -> Result<Json<PatchResponse>, ApiError> {
    let changes = payload.changes()?;
    let workspace = super::resolve(&state, &payload.workspace).await?;

    let patch = state
        .memory
        .patch_memory(&workspace, &payload.memory_id, changes)
        .await
        .map_err(api_error)?;

    Ok(Json(patch.into()))
}

/// Soft-delete a memory
#[utoipa::path(
    post,
    path = "/skills/memory/disable",
    request_body = MemoryIdRequest,
    responses(
        (status = 200, description = "Memory disabled", body = PatchResponse),
        (status = 404, description = "Unknown memory id")
    ),
    tag = "Memory"
)]
pub async fn disable_memory(
    State(state): State<AppState>,
    Json(payload): Json<MemoryIdRequest>,
) -> Result<Json<PatchResponse>, ApiError> {
    let workspace = super::resolve(&state, &payload.workspace).await?;
    let patch = state
        .memory
        .disable_memory(&workspace, &payload.memory_id)
        .await
        .map_err(api_error)?;
    Ok(Json(patch.into()))
}

/// Restore a disabled memory
#[utoipa::path(
    post,
    path = "/skills/memory/enable",
    request_body = MemoryIdRequest,
    responses(
        (status = 200, description = "Memory enabled", body = PatchResponse),
        (status = 404, description = "Unknown memory id")
    ),
    tag = "Memory"
)]
pub async fn enable_memory(
    State(state): State<AppState>,
    Json(payload): Json<MemoryIdRequest>,
) -> Result<Json<PatchResponse>, ApiError> {
    let workspace = super::resolve(&state, &payload.workspace).await?;
    let patch = state
        .memory
        .enable_memory(&workspace, &payload.memory_id)
        .await
        .map_err(api_error)?;
    Ok(Json(patch.into()))
}

/// Keyword recall across the workspace's logs
#[utoipa::path(
    post,
    path = "/skills/memory/search",
    request_body = SearchMemoriesRequest,
    responses(
        (status = 200, description = "Matching enabled memories", body = Vec<MemoryResponse>)
    ),
    tag = "Memory"
)]
pub async fn search_memories(
    State(state): State<AppState>,
    Json(payload): Json<SearchMemoriesRequest>,
) -> Result<Json<Vec<MemoryResponse>>, ApiError> {
    let workspace = super::resolve(&state, &payload.workspace).await?;
    let memories = state
        .memory
        .search_memories(
            &workspace,
            &payload.keywords,
            SearchMemoriesOptions {
                limit: payload.limit,
            },
        )
        .await
        .map_err(api_error)?;

    Ok(Json(memories.into_iter().map(MemoryResponse::from).collect()))
}

/// Enabled high-importance memories, oldest first
#[utoipa::path(
    post,
    path = "/skills/memory/important",
    request_body = ResolveWorkspaceRequest,
    responses(
        (status = 200, description = "Important memories", body = Vec<MemoryResponse>)
    ),
    tag = "Memory"
)]
pub async fn important_memories(
    State(state): State<AppState>,
    Json(payload): Json<ResolveWorkspaceRequest>,
) -> Result<Json<Vec<MemoryResponse>>, ApiError> {
    let workspace = super::resolve(&state, &payload.workspace).await?;
    let memories = state
        .memory
        .get_important_memories(&workspace)
        .await
        .map_err(api_error)?;

    Ok(Json(memories.into_iter().map(MemoryResponse::from).collect()))
}

/// Every memory of the workspace, oldest first
#[utoipa::path(
    post,
    path = "/skills/memory/list",
    request_body = ListMemoriesRequest,
    responses(
        (status = 200, description = "Memories", body = Vec<MemoryResponse>)
    ),
    tag = "Memory"
)]
pub async fn list_memories(
    State(state): State<AppState>,
    Json(payload): Json<ListMemoriesRequest>,
) -> Result<Json<Vec<MemoryResponse>>, ApiError> {
    let workspace = super::resolve(&state, &payload.workspace).await?;
    let memories = state
        .memory
        .list_memories(&workspace, payload.include_disabled)
        .await
        .map_err(api_error)?;

    Ok(Json(memories.into_iter().map(MemoryResponse::from).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/skills/memory/add", post(add_memory))
        .route("/skills/memory/patch", post(patch_memory))
        .route("/skills/memory/disable", post(disable_memory))
        .route("/skills/memory/enable", post(enable_memory))
        .route("/skills/memory/search", post(search_memories))
        .route("/skills/memory/important", post(important_memories))
        .route("/skills/memory/list", post(list_memories))
}
