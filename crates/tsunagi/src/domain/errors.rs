//! Domain Errors
//!
//! Error types for workspace, memory and platform operations.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Access denied: {path} is outside of {boundary}")]
    WorkspaceAccessDenied { path: PathBuf, boundary: PathBuf },

    #[error("Workspace file not found: {path}")]
    WorkspaceNotFound { path: PathBuf },

    #[error("Memory read failed: {0}")]
    MemoryReadFailed(String),

    #[error("Memory write failed: {0}")]
    MemoryWriteFailed(String),

    #[error("Platform send failed: {0}")]
    PlatformSendFailed(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DomainError {
    pub fn access_denied(path: impl AsRef<Path>, boundary: impl AsRef<Path>) -> Self {
        Self::WorkspaceAccessDenied {
            path: path.as_ref().to_path_buf(),
            boundary: boundary.as_ref().to_path_buf(),
        }
    }

    pub fn not_found(path: impl AsRef<Path>) -> Self {
        Self::WorkspaceNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Only platform send failures may be retried, and only by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PlatformSendFailed(_))
    }
}
