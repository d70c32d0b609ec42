//! Handlers for the `/admin/characters` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use illustra_core::relations::RelationKind;
use illustra_core::types::DbId;
use illustra_db::models::character::{Character, CreateCharacter, UpdateCharacter};
use validator::Validate;

use super::{not_found, replaced_file, search_term, unreferenced_files};
use crate::cache::{CHARACTERS, ILLUSTRATIONS};
use crate::error::AppResult;
use crate::middleware::admin::Admin;
use crate::query::{PaginationParams, SearchParams};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::delete_best_effort;

const ENTITY: &str = "Character";

/// POST /api/v1/admin/characters
pub async fn create(
    State(state): State<AppState>,
    admin: Admin,
    Json(input): Json<CreateCharacter>,
) -> AppResult<(StatusCode, Json<DataResponse<Character>>)> {
    input.validate()?;
    let mut session = state.store.session().await?;
    let character = session.create_character(&input).await?;

    state.cache.invalidate_prefix(CHARACTERS).await;
    state.cache.invalidate_prefix(ILLUSTRATIONS).await;
    tracing::info!(
        character_id = character.id,
        operator_id = admin.operator_id,
        "Character created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: character })))
}

/// GET /api/v1/admin/characters
pub async fn list(
    State(state): State<AppState>,
    _admin: Admin,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<Character>>>> {
    let (limit, offset) = params.bounds();
    let mut session = state.store.session().await?;
    let characters = session.list_characters(limit, offset).await?;
    Ok(Json(DataResponse { data: characters }))
}

/// GET /api/v1/admin/characters/search?q=
pub async fn search(
    State(state): State<AppState>,
    _admin: Admin,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<Character>>>> {
    let term = search_term(&params.q)?;
    let (limit, offset) = params.bounds();
    let mut session = state.store.session().await?;
    let characters = session.search_characters(&term, limit, offset).await?;
    Ok(Json(DataResponse { data: characters }))
}

/// GET /api/v1/admin/characters/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Character>>> {
    let mut session = state.store.session().await?;
    let character = session
        .find_character(id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    Ok(Json(DataResponse { data: character }))
}

/// PUT /api/v1/admin/characters/{id}
///
/// A replaced image file is removed from storage after the update commits.
pub async fn update(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCharacter>,
) -> AppResult<Json<DataResponse<Character>>> {
    input.validate()?;
    let mut tx = state.store.begin().await?;
    let old = tx.find_character(id).await?.ok_or_else(|| not_found(ENTITY, id))?;
    let character = tx
        .update_character(id, &input)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    let replaced = replaced_file(old.filename.as_deref(), character.filename.as_deref());
    let obsolete = unreferenced_files(&mut *tx, replaced.into_iter().collect()).await?;
    tx.commit().await?;

    delete_best_effort(state.storage.as_ref(), &obsolete).await;

    state.cache.invalidate_prefix(CHARACTERS).await;
    state.cache.invalidate_prefix(ILLUSTRATIONS).await;
    tracing::info!(
        character_id = id,
        operator_id = admin.operator_id,
        "Character updated",
    );
    Ok(Json(DataResponse { data: character }))
}

/// DELETE /api/v1/admin/characters/{id}
///
/// Unlinks the character from every image, then deletes it.
pub async fn delete(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let mut tx = state.store.begin().await?;
    let character = tx.find_character(id).await?.ok_or_else(|| not_found(ENTITY, id))?;
    let unlinked = tx
        .delete_relations_by_related(RelationKind::Character, id)
        .await?;
    tx.delete_character(id).await?;
    let files = unreferenced_files(&mut *tx, character.filename.into_iter().collect()).await?;
    tx.commit().await?;

    delete_best_effort(state.storage.as_ref(), &files).await;

    state.cache.invalidate_prefix(CHARACTERS).await;
    state.cache.invalidate_prefix(ILLUSTRATIONS).await;
    tracing::info!(
        character_id = id,
        unlinked,
        operator_id = admin.operator_id,
        "Character deleted",
    );
    Ok(StatusCode::NO_CONTENT)
}
