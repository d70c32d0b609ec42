//! Handlers for the `/admin/child-categories` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use illustra_core::relations::RelationKind;
use illustra_core::types::DbId;
use illustra_db::models::category::{ChildCategory, CreateChildCategory, UpdateChildCategory};
use illustra_db::store::CatalogSession;
use validator::Validate;

use super::{not_found, search_term};
use crate::cache::{CATEGORIES, ILLUSTRATIONS};
use crate::error::AppResult;
use crate::middleware::admin::Admin;
use crate::query::{PaginationParams, SearchParams};
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "ChildCategory";

/// 404 unless the parent category exists.
async fn require_parent(session: &mut dyn CatalogSession, parent_id: DbId) -> AppResult<()> {
    session
        .find_parent_category(parent_id)
        .await?
        .ok_or_else(|| not_found("ParentCategory", parent_id))?;
    Ok(())
}

/// POST /api/v1/admin/child-categories
pub async fn create(
    State(state): State<AppState>,
    admin: Admin,
    Json(input): Json<CreateChildCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<ChildCategory>>)> {
    input.validate()?;
    let mut tx = state.store.begin().await?;
    require_parent(&mut *tx, input.parent_id).await?;
    let child = tx.create_child_category(&input).await?;
    tx.commit().await?;

    state.cache.invalidate_prefix(CATEGORIES).await;
    state.cache.invalidate_prefix(ILLUSTRATIONS).await;
    tracing::info!(
        child_category_id = child.id,
        parent_id = child.parent_id,
        operator_id = admin.operator_id,
        "Child category created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: child })))
}

/// GET /api/v1/admin/child-categories
pub async fn list(
    State(state): State<AppState>,
    _admin: Admin,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<ChildCategory>>>> {
    let (limit, offset) = params.bounds();
    let mut session = state.store.session().await?;
    let children = session.list_child_categories(limit, offset).await?;
    Ok(Json(DataResponse { data: children }))
}

/// GET /api/v1/admin/child-categories/search?q=
pub async fn search(
    State(state): State<AppState>,
    _admin: Admin,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<DataResponse<Vec<ChildCategory>>>> {
    let term = search_term(&params.q)?;
    let (limit, offset) = params.bounds();
    let mut session = state.store.session().await?;
    let children = session.search_child_categories(&term, limit, offset).await?;
    Ok(Json(DataResponse { data: children }))
}

/// GET /api/v1/admin/child-categories/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ChildCategory>>> {
    let mut session = state.store.session().await?;
    let child = session
        .find_child_category(id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    Ok(Json(DataResponse { data: child }))
}

/// PUT /api/v1/admin/child-categories/{id}
///
/// Moving a child to another parent requires that parent to exist.
pub async fn update(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateChildCategory>,
) -> AppResult<Json<DataResponse<ChildCategory>>> {
    input.validate()?;
    let mut tx = state.store.begin().await?;
    if let Some(parent_id) = input.parent_id {
        require_parent(&mut *tx, parent_id).await?;
    }
    let child = tx
        .update_child_category(id, &input)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    tx.commit().await?;

    state.cache.invalidate_prefix(CATEGORIES).await;
    state.cache.invalidate_prefix(ILLUSTRATIONS).await;
    tracing::info!(
        child_category_id = id,
        operator_id = admin.operator_id,
        "Child category updated",
    );
    Ok(Json(DataResponse { data: child }))
}

/// DELETE /api/v1/admin/child-categories/{id}
pub async fn delete(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let mut tx = state.store.begin().await?;
    tx.find_child_category(id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    let unlinked = tx
        .delete_relations_by_related(RelationKind::ChildCategory, id)
        .await?;
    tx.delete_child_category(id).await?;
    tx.commit().await?;

    state.cache.invalidate_prefix(CATEGORIES).await;
    state.cache.invalidate_prefix(ILLUSTRATIONS).await;
    tracing::info!(
        child_category_id = id,
        unlinked,
        operator_id = admin.operator_id,
        "Child category deleted",
    );
    Ok(StatusCode::NO_CONTENT)
}
