use anyhow::Context;
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use tsunagi::{MemoryStore, WorkspaceManager};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod auth;
mod error;
mod models;
mod routes;
mod settings;

use auth::SkillToken;
use settings::ServerSettings;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub workspaces: Arc<WorkspaceManager>,
    pub memory: Arc<MemoryStore>,
}

impl AppState {
    pub fn new(workspaces: Arc<WorkspaceManager>, memory: MemoryStore) -> Self {
        Self {
            workspaces,
            memory: Arc::new(memory),
        }
    }
}

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    message: String,
    version: String,
}

async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        message: "Tsunagi skill server is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the full router: public health and docs, token-protected skills
pub fn app(state: AppState, token: SkillToken) -> Router {
    let protected_routes = Router::new()
        .merge(routes::workspace::router())
        .merge(routes::memory::router())
        .layer(middleware::from_fn_with_state(token, auth::auth_middleware));

    let openapi = routes::swagger::ApiDoc::openapi();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = ServerSettings::from_env()?;
    let root = settings.bridge.workspaces_root();

    let workspaces = Arc::new(
        WorkspaceManager::from_config(&settings.bridge)
            .with_context(|| format!("cannot use workspaces root {}", root.display()))?,
    );
    let memory = MemoryStore::from_config(Arc::clone(&workspaces), &settings.bridge);
    let state = AppState::new(workspaces, memory);

    if settings.skill_token.is_some() {
        tracing::info!("Skill token authentication enabled");
    } else {
        tracing::warn!("No TSUNAGI_SKILL_TOKEN set - authentication disabled");
    }

    let router = app(state, SkillToken::new(settings.skill_token.clone()));
    let listener = tokio::net::TcpListener::bind(settings.bind)
        .await
        .with_context(|| format!("cannot bind {}", settings.bind))?;

    tracing::info!(
        bind = %settings.bind,
        workspaces = %root.display(),
        fast_path = settings.bridge.search.fast_path,
        "Tsunagi skill server ready"
    );
    tracing::info!("Swagger UI: /swagger-ui");

    axum::serve(listener, router)
        .await
        .context("server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use tsunagi::{KeywordSearch, MemoryConfig};

    use super::*;

    fn test_app(token: Option<&str>) -> (tempfile::TempDir, Router) {
        let temp = tempfile::tempdir().unwrap();
        let workspaces = Arc::new(WorkspaceManager::new(temp.path()).unwrap());
        let memory = MemoryStore::new(
            Arc::clone(&workspaces),
            KeywordSearch::new(),
            MemoryConfig::default(),
        );
        let state = AppState::new(workspaces, memory);
        let app = app(state, SkillToken::new(token.map(str::to_string)));
        (temp, app)
    }

    async fn call(app: &Router, path: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::post(path).header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = app
            .clone()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    fn dm() -> Value {
        json!({ "platform": "discord", "user_id": "u1", "channel_id": "c1", "is_dm": true })
    }

    fn guild() -> Value {
        json!({ "platform": "discord", "user_id": "u1", "channel_id": "g1" })
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (_temp, app) = test_app(Some("secret"));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_skills_require_token() {
        let (_temp, app) = test_app(Some("secret"));
        let body = json!({ "workspace": dm() });

        let (status, _) = call(&app, "/skills/workspace/resolve", body.clone(), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&app, "/skills/workspace/resolve", body.clone(), Some("wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, ws) = call(&app, "/skills/workspace/resolve", body, Some("secret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ws["key"], "discord/u1/c1");
        assert_eq!(ws["is_dm"], true);
    }

    #[tokio::test]
    async fn test_memory_lifecycle() {
        let (_temp, app) = test_app(None);

        let (status, added) = call(
            &app,
            "/skills/memory/add",
            json!({ "workspace": dm(), "content": "Loves hiking in Hokkaido", "importance": "high" }),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = added["id"].as_str().unwrap().to_string();
        assert_eq!(added["importance"], "high");

        let (_, found) = call(
            &app,
            "/skills/memory/search",
            json!({ "workspace": dm(), "keywords": ["HIKING"] }),
            None,
        )
        .await;
        assert_eq!(found.as_array().unwrap().len(), 1);

        let (_, important) =
            call(&app, "/skills/memory/important", json!({ "workspace": dm() }), None).await;
        assert_eq!(important[0]["id"], id.as_str());

        let (status, patch) = call(
            &app,
            "/skills/memory/disable",
            json!({ "workspace": dm(), "memory_id": id }),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patch["target_id"], id.as_str());

        let (_, found) = call(
            &app,
            "/skills/memory/search",
            json!({ "workspace": dm(), "keywords": ["hiking"] }),
            None,
        )
        .await;
        assert!(found.as_array().unwrap().is_empty());

        let (_, listed) = call(
            &app,
            "/skills/memory/list",
            json!({ "workspace": dm(), "include_disabled": true }),
            None,
        )
        .await;
        assert_eq!(listed[0]["enabled"], false);

        let (status, _) = call(
            &app,
            "/skills/memory/enable",
            json!({ "workspace": dm(), "memory_id": id }),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(
            &app,
            "/skills/memory/patch",
            json!({ "workspace": dm(), "memory_id": id, "importance": "normal" }),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, listed) =
            call(&app, "/skills/memory/list", json!({ "workspace": dm() }), None).await;
        assert_eq!(listed[0]["enabled"], true);
        assert_eq!(listed[0]["importance"], "normal");
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let (_temp, app) = test_app(None);

        let (status, _) = call(
            &app,
            "/skills/memory/add",
            json!({ "workspace": guild(), "content": "secret", "visibility": "private" }),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            "/skills/memory/disable",
            json!({ "workspace": guild(), "memory_id": "mem_missing" }),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            &app,
            "/skills/memory/patch",
            json!({ "workspace": guild(), "memory_id": "mem_missing" }),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            "/skills/workspace/resolve",
            json!({ "workspace": { "platform": "irc", "user_id": "u", "channel_id": "c" } }),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_dm_flag_cannot_change_existing_workspace() {
        let (temp, app) = test_app(None);

        let (status, _) = call(&app, "/skills/workspace/resolve", json!({ "workspace": guild() }), None).await;
        assert_eq!(status, StatusCode::OK);

        let claimed_dm = json!({ "platform": "discord", "user_id": "u1", "channel_id": "g1", "is_dm": true });
        let (status, _) = call(
            &app,
            "/skills/memory/add",
            json!({ "workspace": claimed_dm, "content": "secret", "visibility": "private" }),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(!temp.path().join("discord/u1/g1/memory.private.jsonl").exists());

        let (status, ws) = call(&app, "/skills/workspace/resolve", json!({ "workspace": guild() }), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ws["is_dm"], false);
    }

    #[tokio::test]
    async fn test_traversal_ids_stay_inside_root() {
        let (temp, app) = test_app(None);

        let (status, ws) = call(
            &app,
            "/skills/workspace/resolve",
            json!({ "workspace": { "platform": "discord", "user_id": "../../etc", "channel_id": ".." } }),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let path = std::path::PathBuf::from(ws["path"].as_str().unwrap());
        assert!(path.starts_with(temp.path()));
        assert!(!ws["key"].as_str().unwrap().contains(".."));
    }
}
