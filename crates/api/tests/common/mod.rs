#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use chrono::{Duration, Utc};
use illustra_api::auth::password::hash_new_password;
use illustra_api::auth::tokens::sign_access_token;
use illustra_api::cache::ResponseCache;
use illustra_api::config::{ServerConfig, TokenConfig};
use illustra_api::router::build_app_router;
use illustra_api::state::AppState;
use illustra_api::storage::LocalStorage;
use illustra_db::models::operator::{CreateOperator, Operator};
use illustra_db::models::session::CreateSession;
use illustra_db::store::{CatalogStore, MemoryCatalogStore, PgCatalogStore};
use illustra_db::DbPool;

pub const TEST_OPERATOR: &str = "curator";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(storage_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        request_timeout_secs: 30,
        cache_ttl_secs: 300,
        storage_dir: storage_dir.to_path_buf(),
        storage_public_url: "/static/images".to_string(),
        max_upload_bytes: 1024,
        tokens: TokenConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_ttl: Duration::minutes(15),
            refresh_ttl: Duration::days(7),
        },
    }
}

/// The production router over a store and a temporary storage directory,
/// plus handles to inspect both.
pub struct TestApp<S = MemoryCatalogStore> {
    pub router: Router,
    pub store: S,
    pub state: AppState,
    pub storage_dir: TempDir,
}

impl<S: CatalogStore> TestApp<S> {
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Seed the test operator, open a refresh session for it, and return an
    /// access token bound to that session.
    pub async fn admin_token(&self) -> String {
        let operator = self.seed_operator(TEST_OPERATOR, TEST_PASSWORD).await;
        let mut session = self.store.session().await.unwrap();
        let row = session
            .create_session(&CreateSession {
                operator_id: operator.id,
                refresh_token_hash: format!("test-session-{}", uuid::Uuid::new_v4()),
                user_agent: None,
                expires_at: Utc::now() + Duration::days(7),
            })
            .await
            .unwrap();
        sign_access_token(&self.state.config.tokens, operator.id, row.id).unwrap()
    }

    pub async fn seed_operator(&self, name: &str, password: &str) -> Operator {
        let mut session = self.store.session().await.unwrap();
        if let Some(existing) = session.find_operator_by_name(name).await.unwrap() {
            return existing;
        }
        session
            .create_operator(&CreateOperator {
                name: name.to_string(),
                password_hash: hash_new_password(password).unwrap(),
            })
            .await
            .unwrap()
    }
}

/// Build the full application router (same middleware stack as `main.rs`)
/// over a fresh [`MemoryCatalogStore`].
pub fn build_test_app() -> TestApp {
    build_test_app_with(|_| {})
}

/// Like [`build_test_app`], with a chance to adjust the config first.
pub fn build_test_app_with(adjust: impl FnOnce(&mut ServerConfig)) -> TestApp {
    assemble(MemoryCatalogStore::new(), adjust)
}

/// The full application router over a migrated Postgres pool, as handed to
/// a `#[sqlx::test]`.
pub fn build_pg_test_app(pool: DbPool) -> TestApp<PgCatalogStore> {
    assemble(PgCatalogStore::new(pool), |_| {})
}

fn assemble<S>(store: S, adjust: impl FnOnce(&mut ServerConfig)) -> TestApp<S>
where
    S: CatalogStore + Clone + 'static,
{
    let storage_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(storage_dir.path());
    adjust(&mut config);

    let state = AppState {
        store: Arc::new(store.clone()),
        cache: Arc::new(ResponseCache::new(std::time::Duration::from_secs(
            config.cache_ttl_secs,
        ))),
        storage: Arc::new(LocalStorage::new(config.storage_dir.clone())),
        config: Arc::new(config.clone()),
    };
    let router = build_app_router(state.clone(), &config);

    TestApp {
        router,
        store,
        state,
        storage_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    json_request(app, Method::POST, uri, None, body).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    json_request(app, Method::POST, uri, Some(token), body).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    json_request(app, Method::PUT, uri, Some(token), body).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn json_request(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create an entity through the admin API and return its id.
pub async fn create_entity(app: Router, token: &str, uri: &str, body: serde_json::Value) -> i64 {
    let response = post_json_auth(app, uri, token, body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED, "POST {uri}");
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

pub async fn create_character(app: Router, token: &str, name: &str) -> i64 {
    let body = serde_json::json!({ "name": name, "src": format!("/static/images/{name}.png") });
    create_entity(app, token, "/api/v1/admin/characters", body).await
}

pub async fn create_parent(app: Router, token: &str, name: &str) -> i64 {
    let body = serde_json::json!({ "name": name, "src": format!("/static/images/{name}.png") });
    create_entity(app, token, "/api/v1/admin/parent-categories", body).await
}

pub async fn create_child(app: Router, token: &str, name: &str, parent_id: i64) -> i64 {
    let body = serde_json::json!({ "name": name, "parent_id": parent_id });
    create_entity(app, token, "/api/v1/admin/child-categories", body).await
}
