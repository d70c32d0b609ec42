//! The full router over `PgCatalogStore`.
//!
//! Each test gets a fresh database migrated by `#[sqlx::test]` on the server
//! named by `DATABASE_URL`.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_pg_test_app, create_character, create_child, create_parent, get, get_auth,
    post_json, post_json_auth, put_json_auth, TEST_OPERATOR, TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

const ILLUSTRATIONS: &str = "/api/v1/admin/illustrations";

#[sqlx::test(migrations = "../db/migrations")]
async fn illustration_round_trip_through_postgres(pool: PgPool) {
    let app = build_pg_test_app(pool);
    let token = app.admin_token().await;
    let mika = create_character(app.app(), &token, "mika").await;
    let season = create_parent(app.app(), &token, "season").await;
    let summer = create_child(app.app(), &token, "summer", season).await;

    let response = post_json_auth(
        app.app(),
        ILLUSTRATIONS,
        &token,
        json!({
            "title": "Summer Festival",
            "original_src": "/static/images/festival.png",
            "simple_src": "/static/images/festival-simple.png",
            "character_ids": [mika],
            "parent_category_ids": [season],
            "child_category_ids": [summer],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let image_id = body_json(response).await["data"]["image"]["id"]
        .as_i64()
        .unwrap();

    let json = body_json(get(app.app(), &format!("/api/v1/illustrations/{image_id}")).await).await;
    assert_eq!(json["data"]["characters"][0]["id"], mika);
    assert_eq!(json["data"]["categories"][0]["parent_category"]["id"], season);
    assert_eq!(json["data"]["categories"][0]["child_category"][0]["id"], summer);

    let json = body_json(get(app.app(), "/api/v1/illustrations/search?q=FESTIVAL").await).await;
    assert_eq!(json["data"][0]["image"]["id"], image_id);

    let response = put_json_auth(
        app.app(),
        &format!("{ILLUSTRATIONS}/{image_id}"),
        &token,
        json!({ "simple_src": null, "character_ids": [] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert!(data["image"]["simple_src"].is_null());
    assert_eq!(data["image"]["title"], "Summer Festival");
    assert_eq!(data["characters"], json!([]));
    assert_eq!(data["categories"][0]["parent_category"]["id"], season);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_relation_rolls_back_the_image(pool: PgPool) {
    let app = build_pg_test_app(pool);
    let token = app.admin_token().await;

    let response = post_json_auth(
        app.app(),
        ILLUSTRATIONS,
        &token,
        json!({
            "title": "Ghost",
            "original_src": "/static/images/ghost.png",
            "character_ids": [4040],
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "FOREIGN_KEY_VIOLATION");
    let listing = body_json(get(app.app(), "/api/v1/illustrations").await).await;
    assert_eq!(listing["data"], json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_ends_the_session_in_postgres(pool: PgPool) {
    let app = build_pg_test_app(pool);
    app.seed_operator(TEST_OPERATOR, TEST_PASSWORD).await;
    let body = json!({ "name": TEST_OPERATOR, "password": TEST_PASSWORD });
    let login = body_json(post_json(app.app(), "/api/v1/admin/auth/login", body).await).await;
    let access = login["access_token"].as_str().unwrap();

    let response = get_auth(app.app(), "/api/v1/admin/characters", access).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response =
        post_json_auth(app.app(), "/api/v1/admin/auth/logout", access, json!({})).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.app(), "/api/v1/admin/characters", access).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
