//! HTTP-level integration tests for the admin illustration endpoints.
//!
//! Every mutation writes the image row and all three relation kinds in one
//! transaction; these tests drive the router against the in-memory store and
//! inspect the persisted join rows directly.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_character, create_child, create_entity, create_parent,
    delete_auth, get, get_auth, post_json, post_json_auth, put_json_auth, TestApp,
};
use illustra_core::relations::RelationKind;
use illustra_db::store::{MemoryOp, WriteCounts};
use serde_json::json;

const ILLUSTRATIONS: &str = "/api/v1/admin/illustrations";

async fn create_illustration(
    app: &TestApp,
    token: &str,
    body: serde_json::Value,
) -> serde_json::Value {
    let response = post_json_auth(app.app(), ILLUSTRATIONS, token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

fn ids(values: &serde_json::Value) -> Vec<i64> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_i64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_links_relations_and_groups_children_by_parent() {
    let app = build_test_app();
    let token = app.admin_token().await;
    let mika = create_character(app.app(), &token, "mika").await;
    let season = create_parent(app.app(), &token, "season").await;
    let place = create_parent(app.app(), &token, "place").await;
    let summer = create_child(app.app(), &token, "summer", season).await;
    let beach = create_child(app.app(), &token, "beach", place).await;

    let data = create_illustration(
        &app,
        &token,
        json!({
            "title": "Seaside",
            "original_src": "/static/images/seaside.png",
            "simple_src": "/static/images/seaside-simple.png",
            "character_ids": [mika],
            "parent_category_ids": [season, place],
            "child_category_ids": [beach, summer],
        }),
    )
    .await;

    assert_eq!(data["image"]["title"], "Seaside");
    assert_eq!(data["image"]["simple_src"], "/static/images/seaside-simple.png");
    assert_eq!(ids(&data["characters"]), [mika]);

    let categories = data["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0]["parent_category"]["id"], season);
    assert_eq!(ids(&categories[0]["child_category"]), [summer]);
    assert_eq!(categories[1]["parent_category"]["id"], place);
    assert_eq!(ids(&categories[1]["child_category"]), [beach]);
}

#[tokio::test]
async fn create_without_relations_returns_empty_lists() {
    let app = build_test_app();
    let token = app.admin_token().await;

    let data = create_illustration(
        &app,
        &token,
        json!({ "title": "Sketch", "original_src": "/static/images/sketch.png" }),
    )
    .await;

    assert_eq!(data["characters"], json!([]));
    assert_eq!(data["categories"], json!([]));
}

#[tokio::test]
async fn create_with_unknown_character_is_rejected_and_nothing_persists() {
    let app = build_test_app();
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
    let json = body_json(response).await;
    assert_eq!(json["code"], "FOREIGN_KEY_VIOLATION");

    let listing = body_json(get(app.app(), "/api/v1/illustrations").await).await;
    assert_eq!(listing["data"], json!([]));
}

#[tokio::test]
async fn create_with_blank_title_fails_validation() {
    let app = build_test_app();
    let token = app.admin_token().await;

    let response = post_json_auth(
        app.app(),
        ILLUSTRATIONS,
        &token,
        json!({ "title": "", "original_src": "/static/images/a.png" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn create_requires_authentication() {
    let app = build_test_app();

    let response = post_json(
        app.app(),
        ILLUSTRATIONS,
        json!({ "title": "Anon", "original_src": "/static/images/a.png" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_swaps_one_character_with_one_delete_and_one_insert() {
    let app = build_test_app();
    let token = app.admin_token().await;
    let a = create_character(app.app(), &token, "a").await;
    let b = create_character(app.app(), &token, "b").await;
    let c = create_character(app.app(), &token, "c").await;
    let created = create_illustration(
        &app,
        &token,
        json!({ "title": "Swap", "original_src": "/static/images/s.png", "character_ids": [a, b] }),
    )
    .await;
    let image_id = created["image"]["id"].as_i64().unwrap();
    app.store.reset_write_counts();

    let response = put_json_auth(
        app.app(),
        &format!("{ILLUSTRATIONS}/{image_id}"),
        &token,
        json!({ "character_ids": [b, c] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(ids(&data["characters"]), [b, c]);

    let writes = app.store.write_counts(RelationKind::Character);
    assert_eq!((writes.created, writes.deleted), (1, 1));
    assert_eq!(app.store.related_ids(RelationKind::Character, image_id), [b, c]);
}

#[tokio::test]
async fn update_with_same_relations_writes_no_join_rows() {
    let app = build_test_app();
    let token = app.admin_token().await;
    let a = create_character(app.app(), &token, "a").await;
    let season = create_parent(app.app(), &token, "season").await;
    let created = create_illustration(
        &app,
        &token,
        json!({
            "title": "Steady",
            "original_src": "/static/images/s.png",
            "character_ids": [a],
            "parent_category_ids": [season],
        }),
    )
    .await;
    let image_id = created["image"]["id"].as_i64().unwrap();
    app.store.reset_write_counts();

    let response = put_json_auth(
        app.app(),
        &format!("{ILLUSTRATIONS}/{image_id}"),
        &token,
        json!({
            "character_ids": [a, a],
            "parent_category_ids": [season],
            "child_category_ids": [],
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    for kind in RelationKind::ALL {
        assert_eq!(app.store.write_counts(kind), WriteCounts::default(), "{kind}");
    }
}

#[tokio::test]
async fn omitted_lists_are_kept_and_empty_lists_unlink() {
    let app = build_test_app();
    let token = app.admin_token().await;
    let a = create_character(app.app(), &token, "a").await;
    let season = create_parent(app.app(), &token, "season").await;
    let created = create_illustration(
        &app,
        &token,
        json!({
            "title": "Partial",
            "original_src": "/static/images/p.png",
            "character_ids": [a],
            "parent_category_ids": [season],
        }),
    )
    .await;
    let image_id = created["image"]["id"].as_i64().unwrap();

    let response = put_json_auth(
        app.app(),
        &format!("{ILLUSTRATIONS}/{image_id}"),
        &token,
        json!({ "title": "Partial (final)", "parent_category_ids": [] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await["data"].clone();
    assert_eq!(data["image"]["title"], "Partial (final)");
    assert_eq!(ids(&data["characters"]), [a]);
    assert_eq!(data["categories"], json!([]));
}

#[tokio::test]
async fn failed_update_leaves_image_and_relations_unchanged() {
    let app = build_test_app();
    let token = app.admin_token().await;
    let a = create_character(app.app(), &token, "a").await;
    let b = create_character(app.app(), &token, "b").await;
    let season = create_parent(app.app(), &token, "season").await;
    let created = create_illustration(
        &app,
        &token,
        json!({ "title": "Before", "original_src": "/static/images/b.png", "character_ids": [a] }),
    )
    .await;
    let image_id = created["image"]["id"].as_i64().unwrap();
    app.store
        .fail_on(MemoryOp::CreateRelation(RelationKind::ParentCategory));

    let response = put_json_auth(
        app.app(),
        &format!("{ILLUSTRATIONS}/{image_id}"),
        &token,
        json!({ "title": "After", "character_ids": [b], "parent_category_ids": [season] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "INTERNAL_ERROR");

    app.store.clear_faults();
    assert_eq!(app.store.related_ids(RelationKind::Character, image_id), [a]);
    assert!(app
        .store
        .related_ids(RelationKind::ParentCategory, image_id)
        .is_empty());
    let response = get_auth(app.app(), &format!("{ILLUSTRATIONS}/{image_id}"), &token).await;
    let current = body_json(response).await;
    assert_eq!(current["data"]["image"]["title"], "Before");
}

#[tokio::test]
async fn update_missing_illustration_returns_404() {
    let app = build_test_app();
    let token = app.admin_token().await;

    let response = put_json_auth(
        app.app(),
        &format!("{ILLUSTRATIONS}/999"),
        &token,
        json!({ "title": "Nobody" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Image with id 999 not found");
}

#[tokio::test]
async fn update_removes_replaced_files_from_storage() {
    let app = build_test_app();
    let token = app.admin_token().await;
    let dir = app.storage_dir.path();
    std::fs::write(dir.join("old.png"), b"old").unwrap();
    std::fs::write(dir.join("keep.png"), b"keep").unwrap();
    let created = create_illustration(
        &app,
        &token,
        json!({
            "title": "Files",
            "original_src": "/static/images/old.png",
            "original_filename": "old.png",
            "simple_src": "/static/images/keep.png",
            "simple_filename": "keep.png",
        }),
    )
    .await;
    let image_id = created["image"]["id"].as_i64().unwrap();

    let response = put_json_auth(
        app.app(),
        &format!("{ILLUSTRATIONS}/{image_id}"),
        &token,
        json!({ "original_src": "/static/images/new.png", "original_filename": "new.png" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!dir.join("old.png").exists());
    assert!(dir.join("keep.png").exists());
}

#[tokio::test]
async fn null_simple_variant_clears_it_and_removes_its_file() {
    let app = build_test_app();
    let token = app.admin_token().await;
    let dir = app.storage_dir.path();
    std::fs::write(dir.join("plain.png"), b"plain").unwrap();
    let created = create_illustration(
        &app,
        &token,
        json!({
            "title": "Lettered",
            "original_src": "/static/images/full.png",
            "simple_src": "/static/images/plain.png",
            "simple_filename": "plain.png",
        }),
    )
    .await;
    let image_id = created["image"]["id"].as_i64().unwrap();

    let response = put_json_auth(
        app.app(),
        &format!("{ILLUSTRATIONS}/{image_id}"),
        &token,
        json!({ "simple_src": null, "simple_filename": null }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let image = body_json(response).await["data"]["image"].clone();
    assert!(image["simple_src"].is_null());
    assert!(image["simple_filename"].is_null());
    assert_eq!(image["title"], "Lettered");
    assert!(!dir.join("plain.png").exists());
}

#[tokio::test]
async fn files_still_named_by_another_row_are_kept() {
    let app = build_test_app();
    let token = app.admin_token().await;
    let dir = app.storage_dir.path();
    std::fs::write(dir.join("mika.png"), b"mika").unwrap();
    create_entity(
        app.app(),
        &token,
        "/api/v1/admin/characters",
        json!({ "name": "Mika", "src": "/static/images/mika.png", "filename": "mika.png" }),
    )
    .await;
    let created = create_illustration(
        &app,
        &token,
        json!({
            "title": "Borrowed",
            "original_src": "/static/images/mika.png",
            "original_filename": "mika.png",
        }),
    )
    .await;
    let image_id = created["image"]["id"].as_i64().unwrap();

    let response = put_json_auth(
        app.app(),
        &format!("{ILLUSTRATIONS}/{image_id}"),
        &token,
        json!({ "original_src": "/static/images/other.png", "original_filename": "other.png" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(dir.join("mika.png").exists());

    let response = put_json_auth(
        app.app(),
        &format!("{ILLUSTRATIONS}/{image_id}"),
        &token,
        json!({ "original_filename": "mika.png" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = delete_auth(app.app(), &format!("{ILLUSTRATIONS}/{image_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(dir.join("mika.png").exists());
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_image_relations_and_files() {
    let app = build_test_app();
    let token = app.admin_token().await;
    let a = create_character(app.app(), &token, "a").await;
    let season = create_parent(app.app(), &token, "season").await;
    let summer = create_child(app.app(), &token, "summer", season).await;
    std::fs::write(app.storage_dir.path().join("gone.png"), b"png").unwrap();
    let created = create_illustration(
        &app,
        &token,
        json!({
            "title": "Doomed",
            "original_src": "/static/images/gone.png",
            "original_filename": "gone.png",
            "character_ids": [a],
            "parent_category_ids": [season],
            "child_category_ids": [summer],
        }),
    )
    .await;
    let image_id = created["image"]["id"].as_i64().unwrap();

    let response = delete_auth(app.app(), &format!("{ILLUSTRATIONS}/{image_id}"), &token).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    for kind in RelationKind::ALL {
        assert!(app.store.related_ids(kind, image_id).is_empty(), "{kind}");
    }
    assert!(!app.storage_dir.path().join("gone.png").exists());
    let response = get(app.app(), &format!("/api/v1/illustrations/{image_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_missing_illustration_returns_404() {
    let app = build_test_app();
    let token = app.admin_token().await;

    let response = delete_auth(app.app(), &format!("{ILLUSTRATIONS}/12345"), &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
