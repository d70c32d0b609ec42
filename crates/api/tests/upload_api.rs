//! HTTP-level integration tests for image uploads and static serving.

mod common;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use common::{body_json, build_test_app, get, send, TestApp};
use http_body_util::BodyExt;

const BOUNDARY: &str = "illustra-test-boundary";

/// Build a `multipart/form-data` request with one file part.
fn multipart_request(token: &str, field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/v1/admin/uploads")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn upload(
    app: &TestApp,
    token: &str,
    filename: &str,
    bytes: &[u8],
) -> axum::response::Response {
    send(app.app(), multipart_request(token, "file", filename, bytes)).await
}

#[tokio::test]
async fn upload_stores_file_under_generated_name() {
    let app = build_test_app();
    let token = app.admin_token().await;

    let response = upload(&app, &token, "Cover Art.PNG", b"\x89PNG fake image").await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let filename = json["data"]["filename"].as_str().unwrap().to_string();
    assert!(filename.ends_with(".png"));
    assert!(!filename.contains("Cover"));
    assert_eq!(json["data"]["src"], format!("/static/images/{filename}"));

    let stored = std::fs::read(app.storage_dir.path().join(&filename)).unwrap();
    assert_eq!(stored, b"\x89PNG fake image");
}

#[tokio::test]
async fn uploaded_file_is_served_at_its_src() {
    let app = build_test_app();
    let token = app.admin_token().await;
    let response = upload(&app, &token, "a.webp", b"webp bytes").await;
    let src = body_json(response).await["data"]["src"]
        .as_str()
        .unwrap()
        .to_string();

    let response = get(app.app(), &src).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[CACHE_CONTROL],
        "public, max-age=31536000, immutable"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"webp bytes");
}

#[tokio::test]
async fn unsupported_extension_is_rejected() {
    let app = build_test_app();
    let token = app.admin_token().await;

    let response = upload(&app, &token, "notes.txt", b"hello").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(std::fs::read_dir(app.storage_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn empty_and_oversized_files_are_rejected() {
    let app = build_test_app();
    let token = app.admin_token().await;

    let response = upload(&app, &token, "empty.png", b"").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let too_big = vec![0u8; app.state.config.max_upload_bytes + 1];
    let response = upload(&app, &token, "big.png", &too_big).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let app = build_test_app();
    let token = app.admin_token().await;

    let response = send(
        app.app(),
        multipart_request(&token, "attachment", "a.png", b"png"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Missing required 'file' field"
    );
}

#[tokio::test]
async fn upload_requires_admin() {
    let app = build_test_app();

    let response = send(app.app(), multipart_request("bogus", "file", "a.png", b"png")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
