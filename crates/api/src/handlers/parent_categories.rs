//! Handlers for the `/admin/parent-categories` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use illustra_core::relations::RelationKind;
use illustra_core::types::DbId;
use illustra_db::models::category::{
    ChildCategory, CreateParentCategory, ParentCategory, UpdateParentCategory,
};
use validator::Validate;

use super::{not_found, replaced_file, search_term, unreferenced_files};
use crate::cache::{CATEGORIES, ILLUSTRATIONS};
use crate::error::AppResult;
use crate::middleware::admin::Admin;
use crate::query::{PaginationParams, SearchParams};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::delete_best_effort;

const ENTITY: &str = "ParentCategory";

/// POST /api/v1/admin/parent-categories
pub async fn create(
    State(state): State<AppState>,
    admin: Admin,
    Json(input): Json<CreateParentCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<ParentCategory>>)> {
    input.validate()?;
    let mut session = state.store.session().await?;
    let parent = session.create_parent_category(&input).await?;

    state.cache.invalidate_prefix(CATEGORIES).await;
    state.cache.invalidate_prefix(ILLUSTRATIONS).await;
    tracing::info!(
        parent_category_id = parent.id,
        operator_id = admin.operator_id,
        "Parent category created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: parent })))
}

/// GET /api/v1/admin/parent-categories
pub async fn list(
    State(state): State<AppState>,
    _admin: Admin,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ParentCategory>>>> {
    let (limit, offset) = params.bounds();
    let mut session = state.store.session().await?;
    let parents = session.list_parent_categories(limit, offset).await?;
    Ok(Json(DataResponse { data: parents }))
}

/// GET /api/v1/admin/parent-categories/search?q=
pub async fn search(
    State(state): State<AppState>,
    _admin: Admin,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<ParentCategory>>>> {
    let term = search_term(&params.q)?;
    let (limit, offset) = params.bounds();
    let mut session = state.store.session().await?;
    let parents = session.search_parent_categories(&term, limit, offset).await?;
    Ok(Json(DataResponse { data: parents }))
}

/// GET /api/v1/admin/parent-categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ParentCategory>>> {
    let mut session = state.store.session().await?;
    let parent = session
        .find_parent_category(id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    Ok(Json(DataResponse { data: parent }))
}

/// GET /api/v1/admin/parent-categories/{id}/child-categories
pub async fn list_children(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ChildCategory>>>> {
    let mut session = state.store.session().await?;
    session
        .find_parent_category(id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    let children = session.list_child_categories_by_parent(id).await?;
    Ok(Json(DataResponse { data: children }))
}

/// PUT /api/v1/admin/parent-categories/{id}
pub async fn update(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateParentCategory>,
) -> AppResult<Json<DataResponse<ParentCategory>>> {
    input.validate()?;
    let mut tx = state.store.begin().await?;
    let old = tx
        .find_parent_category(id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    let parent = tx
        .update_parent_category(id, &input)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    let replaced = replaced_file(old.filename.as_deref(), parent.filename.as_deref());
    let obsolete = unreferenced_files(&mut *tx, replaced.into_iter().collect()).await?;
    tx.commit().await?;

    delete_best_effort(state.storage.as_ref(), &obsolete).await;

    state.cache.invalidate_prefix(CATEGORIES).await;
    state.cache.invalidate_prefix(ILLUSTRATIONS).await;
    tracing::info!(
        parent_category_id = id,
        operator_id = admin.operator_id,
        "Parent category updated",
    );
    Ok(Json(DataResponse { data: parent }))
}

/// DELETE /api/v1/admin/parent-categories/{id}
///
/// Removes, in one transaction: the join rows of every child category, the
/// child categories, the parent's own join rows, and the parent.
pub async fn delete(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let mut tx = state.store.begin().await?;
    let parent = tx
        .find_parent_category(id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;

    let children = tx.list_child_categories_by_parent(id).await?;
    for child in &children {
        tx.delete_relations_by_related(RelationKind::ChildCategory, child.id)
            .await?;
        tx.delete_child_category(child.id).await?;
    }
    tx.delete_relations_by_related(RelationKind::ParentCategory, id)
        .await?;
    tx.delete_parent_category(id).await?;
    let files = unreferenced_files(&mut *tx, parent.filename.into_iter().collect()).await?;
    tx.commit().await?;

    delete_best_effort(state.storage.as_ref(), &files).await;

    state.cache.invalidate_prefix(CATEGORIES).await;
    state.cache.invalidate_prefix(ILLUSTRATIONS).await;
    tracing::info!(
        parent_category_id = id,
        children = children.len(),
        operator_id = admin.operator_id,
        "Parent category deleted",
    );
    Ok(StatusCode::NO_CONTENT)
}
