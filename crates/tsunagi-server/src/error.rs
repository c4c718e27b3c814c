//! DomainError to HTTP status mapping

use axum::http::StatusCode;
use tsunagi::DomainError;

/// Rejection used by every skill handler
pub type ApiError = (StatusCode, String);

pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::WorkspaceAccessDenied { .. } => StatusCode::FORBIDDEN,
        DomainError::WorkspaceNotFound { .. } | DomainError::MemoryReadFailed(_) => {
            StatusCode::NOT_FOUND
        }
        DomainError::MemoryWriteFailed(_) | DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::PlatformSendFailed(_) | DomainError::ExternalService(_) => {
            StatusCode::BAD_GATEWAY
        }
        DomainError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn api_error(error: DomainError) -> ApiError {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!(error = %error, "Skill call failed");
    }
    (status, error.to_string())
}

pub fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, message.into())
}
