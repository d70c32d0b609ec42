//! Handler for `/admin/uploads`: stores an image file and returns its `src`.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use illustra_core::upload::{public_src, storage_filename};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::admin::Admin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Where an uploaded file can be referenced from.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Public URL to put into an entity's `src` field.
    pub src: String,
    /// Stored object name to put into the matching `*filename` field.
    pub filename: String,
}

/// POST /api/v1/admin/uploads
///
/// Accepts a multipart form with a required `file` field. The stored name is
/// generated; only the extension of the client's filename is kept.
pub async fn upload_image(
    State(state): State<AppState>,
    admin: Admin,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<UploadResponse>>)> {
    let mut file_data: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        file_data = Some((filename, data.to_vec()));
    }

    let (original, data) =
        file_data.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }
    let max = state.config.max_upload_bytes;
    if data.len() > max {
        return Err(AppError::BadRequest(format!(
            "Uploaded file exceeds the {max} byte limit"
        )));
    }

    let filename = storage_filename(&original)?;
    state
        .storage
        .put(&filename, &data)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    tracing::info!(
        filename = %filename,
        original = %original,
        size = data.len(),
        operator_id = admin.operator_id,
        "Image uploaded",
    );
    let src = public_src(&state.config.storage_public_url, &filename);
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UploadResponse { src, filename },
        }),
    ))
}
