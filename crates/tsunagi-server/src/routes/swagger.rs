//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use crate::models::{
    AddMemoryRequest, ListMemoriesRequest, MemoryIdRequest, MemoryResponse, PatchMemoryRequest,
    PatchResponse, ResolveWorkspaceRequest, SearchMemoriesRequest, WorkspaceRef,
    WorkspaceResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Workspace endpoints
        super::workspace::resolve_workspace,
        // Memory endpoints
        super::memory::add_memory,
        super::memory::patch_memory,
        super::memory::disable_memory,
        super::memory::enable_memory,
        super::memory::search_memories,
        super::memory::important_memories,
        super::memory::list_memories,
    ),
    info(
        title = "Tsunagi Skill API",
        version = "0.1.0",
        description = "Callbacks the agent uses to read and write its conversation's workspace and memory log.",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Workspace", description = "Workspace - Per-conversation trust boundary"),
        (name = "Memory", description = "Memory - Append-only JSONL memory log"),
    ),
    components(
        schemas(
            // Workspace
            WorkspaceRef,
            ResolveWorkspaceRequest,
            WorkspaceResponse,
            // Memory
            AddMemoryRequest,
            PatchMemoryRequest,
            MemoryIdRequest,
            SearchMemoriesRequest,
            ListMemoriesRequest,
            MemoryResponse,
            PatchResponse,
        )
    ),
)]
pub struct ApiDoc;
