//! HTTP-level integration tests for operator authentication and sessions.

mod common;

use axum::body::Body;
use axum::http::header::AUTHORIZATION;
use axum::http::{Request, StatusCode};
use common::{
    body_json, build_test_app, get_auth, post_json, post_json_auth, TEST_OPERATOR, TEST_PASSWORD,
};
use illustra_api::auth::tokens::sign_access_token;
use serde_json::json;

async fn login(app: &common::TestApp) -> serde_json::Value {
    let body = json!({ "name": TEST_OPERATOR, "password": TEST_PASSWORD });
    let response = post_json(app.app(), "/api/v1/admin/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Login / refresh / logout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_returns_tokens_and_operator() {
    let app = build_test_app();
    let operator = app.seed_operator(TEST_OPERATOR, TEST_PASSWORD).await;

    let json = login(&app).await;

    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["operator"]["id"], operator.id);
    assert_eq!(json["operator"]["name"], TEST_OPERATOR);
    assert!(json["operator"].get("password_hash").is_none());
}

#[tokio::test]
async fn login_with_wrong_password_returns_401() {
    let app = build_test_app();
    app.seed_operator(TEST_OPERATOR, TEST_PASSWORD).await;

    let body = json!({ "name": TEST_OPERATOR, "password": "not-the-password" });
    let response = post_json(app.app(), "/api/v1/admin/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn login_with_unknown_name_returns_401() {
    let app = build_test_app();

    let body = json!({ "name": "nobody", "password": TEST_PASSWORD });
    let response = post_json(app.app(), "/api/v1/admin/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn access_token_from_login_grants_admin_access() {
    let app = build_test_app();
    app.seed_operator(TEST_OPERATOR, TEST_PASSWORD).await;
    let json = login(&app).await;
    let token = json["access_token"].as_str().unwrap();

    let response = get_auth(app.app(), "/api/v1/admin/characters", token).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_rotates_the_refresh_token() {
    let app = build_test_app();
    app.seed_operator(TEST_OPERATOR, TEST_PASSWORD).await;
    let first = login(&app).await;
    let old_refresh = first["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        app.app(),
        "/api/v1/admin/auth/refresh",
        json!({ "refresh_token": old_refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await;
    assert_ne!(second["refresh_token"], first["refresh_token"]);

    let reused = post_json(
        app.app(),
        "/api/v1/admin/auth/refresh",
        json!({ "refresh_token": old_refresh }),
    )
    .await;
    assert_eq!(reused.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_ends_the_previous_access_token() {
    let app = build_test_app();
    app.seed_operator(TEST_OPERATOR, TEST_PASSWORD).await;
    let first = login(&app).await;
    let old_access = first["access_token"].as_str().unwrap();

    let response = post_json(
        app.app(),
        "/api/v1/admin/auth/refresh",
        json!({ "refresh_token": first["refresh_token"].clone() }),
    )
    .await;
    let second = body_json(response).await;
    let new_access = second["access_token"].as_str().unwrap();

    let response = get_auth(app.app(), "/api/v1/admin/characters", old_access).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"],
        "Session has ended, sign in again"
    );

    let response = get_auth(app.app(), "/api/v1/admin/characters", new_access).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_revokes_refresh_and_access_tokens() {
    let app = build_test_app();
    app.seed_operator(TEST_OPERATOR, TEST_PASSWORD).await;
    let json = login(&app).await;
    let access = json["access_token"].as_str().unwrap();
    let refresh = json["refresh_token"].as_str().unwrap();

    let response =
        post_json_auth(app.app(), "/api/v1/admin/auth/logout", access, json!({})).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        app.app(),
        "/api/v1/admin/auth/refresh",
        json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app.app(), "/api/v1/admin/characters", access).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["error"],
        "Session has ended, sign in again"
    );
}

// ---------------------------------------------------------------------------
// Admin extractor
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_routes_reject_missing_and_malformed_tokens() {
    let app = build_test_app();

    let response = common::get(app.app(), "/api/v1/admin/characters").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app.app(), "/api/v1/admin/characters", "garbage").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid or expired token");
}

#[tokio::test]
async fn token_for_a_session_that_never_existed_is_rejected() {
    let app = build_test_app();
    let operator = app.seed_operator(TEST_OPERATOR, TEST_PASSWORD).await;
    let token = sign_access_token(&app.state.config.tokens, operator.id, 9_999).unwrap();

    let response = get_auth(app.app(), "/api/v1/admin/characters", &token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_scheme_is_case_insensitive() {
    let app = build_test_app();
    let token = app.admin_token().await;
    let request = Request::builder()
        .uri("/api/v1/admin/characters")
        .header(AUTHORIZATION, format!("bearer {token}"))
        .body(Body::empty())
        .unwrap();

    let response = common::send(app.app(), request).await;

    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_can_create_another_operator_who_can_log_in() {
    let app = build_test_app();
    let token = app.admin_token().await;

    let response = post_json_auth(
        app.app(),
        "/api/v1/admin/operators",
        &token,
        json!({ "name": "assistant", "password": "long-enough-pass" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["name"], "assistant");

    let response = post_json(
        app.app(),
        "/api/v1/admin/auth/login",
        json!({ "name": "assistant", "password": "long-enough-pass" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn short_operator_password_is_rejected() {
    let app = build_test_app();
    let token = app.admin_token().await;

    let response = post_json_auth(
        app.app(),
        "/api/v1/admin/operators",
        &token,
        json!({ "name": "weak", "password": "short" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn duplicate_operator_name_conflicts() {
    let app = build_test_app();
    let token = app.admin_token().await;

    let response = post_json_auth(
        app.app(),
        "/api/v1/admin/operators",
        &token,
        json!({ "name": TEST_OPERATOR, "password": "another-password" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn ensure_operator_only_creates_once() {
    let app = build_test_app();

    let first = illustra_api::handlers::operators::ensure_operator(
        app.state.store.as_ref(),
        "bootstrap",
        "bootstrap-password",
    )
    .await
    .unwrap();
    let second = illustra_api::handlers::operators::ensure_operator(
        app.state.store.as_ref(),
        "bootstrap",
        "bootstrap-password",
    )
    .await
    .unwrap();

    assert!(first);
    assert!(!second);
}
