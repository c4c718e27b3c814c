//! Memory - Append-only log entries as seen by skills

use serde::{Deserialize, Serialize};
use tsunagi::{Importance, MemoryChanges, MemoryEntry, MemoryPatch, ResolvedMemory, Visibility};
use utoipa::ToSchema;

use super::WorkspaceRef;
use crate::error::{bad_request, ApiError};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddMemoryRequest {
    pub workspace: WorkspaceRef,
    pub content: String,
    /// `public` (default) or `private`
    #[schema(example = "public")]
    pub visibility: Option<String>,
    /// `normal` (default) or `high`
    #[schema(example = "normal")]
    pub importance: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PatchMemoryRequest {
    pub workspace: WorkspaceRef,
    pub memory_id: String,
    pub enabled: Option<bool>,
    pub visibility: Option<String>,
    pub importance: Option<String>,
}

impl PatchMemoryRequest {
    pub fn changes(&self) -> Result<MemoryChanges, ApiError> {
        let changes = MemoryChanges {
            enabled: self.enabled,
            visibility: parse_opt::<Visibility>(self.visibility.as_deref())?,
            importance: parse_opt::<Importance>(self.importance.as_deref())?,
        };
        if changes.is_empty() {
            return Err(bad_request("patch changes nothing"));
        }
        Ok(changes)
    }
}

/// Body for disable / enable
#[derive(Debug, Deserialize, ToSchema)]
pub struct MemoryIdRequest {
    pub workspace: WorkspaceRef,
    pub memory_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchMemoriesRequest {
    pub workspace: WorkspaceRef,
    /// Matched case-insensitively, any keyword suffices
    pub keywords: Vec<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListMemoriesRequest {
    pub workspace: WorkspaceRef,
    #[serde(default)]
    pub include_disabled: bool,
}

/// A memory with every patch applied
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemoryResponse {
    #[schema(example = "mem_lx3k2a1b_9f2k1z")]
    pub id: String,
    pub enabled: bool,
    pub visibility: String,
    pub importance: String,
    pub content: String,
    pub created_at: String,
    pub last_modified_at: String,
}

impl From<ResolvedMemory> for MemoryResponse {
    fn from(memory: ResolvedMemory) -> Self {
        Self {
            id: memory.id,
            enabled: memory.enabled,
            visibility: memory.visibility.to_string(),
            importance: memory.importance.to_string(),
            content: memory.content,
            created_at: memory.created_at,
            last_modified_at: memory.last_modified_at,
        }
    }
}

impl From<MemoryEntry> for MemoryResponse {
    fn from(entry: MemoryEntry) -> Self {
        ResolvedMemory::from(entry).into()
    }
}

/// The patch event that was appended
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PatchResponse {
    pub id: String,
    pub target_id: String,
    pub ts: String,
}

impl From<MemoryPatch> for PatchResponse {
    fn from(patch: MemoryPatch) -> Self {
        Self {
            id: patch.id,
            target_id: patch.target_id,
            ts: patch.ts,
        }
    }
}

pub fn parse_opt<T>(raw: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr<Err = String>,
{
    raw.map(str::parse::<T>).transpose().map_err(bad_request)
}
