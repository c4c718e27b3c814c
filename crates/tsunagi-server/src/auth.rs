//! Simple Skill Token Authentication (Bearer Token)

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};

/// Token skills must present; `None` means auth is disabled
#[derive(Debug, Clone, Default)]
pub struct SkillToken(pub Option<Arc<str>>);

impl SkillToken {
    pub fn new(token: Option<String>) -> Self {
        Self(token.filter(|t| !t.is_empty()).map(Arc::from))
    }
}

/// Authentication middleware
/// Validates the Bearer token against the configured skill token
pub async fn auth_middleware(
    State(token): State<SkillToken>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = token.0.as_deref() else {
        // No token configured = auth disabled (local development)
        return Ok(next.run(request).await);
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(presented) if token_matches(presented, expected) => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!("Invalid skill token attempted");
            Err(StatusCode::UNAUTHORIZED)
        }
        None if auth_header.is_some() => {
            tracing::warn!("Invalid Authorization header format");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("Missing Authorization header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Compare without short-circuiting on the first differing byte
fn token_matches(presented: &str, expected: &str) -> bool {
    let (presented, expected) = (presented.as_bytes(), expected.as_bytes());
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
