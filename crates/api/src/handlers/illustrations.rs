//! Handlers for the `/admin/illustrations` resource.
//!
//! An illustration mutation writes the image row and reconciles all three
//! relation kinds on one transactional session, so a failure at any step
//! leaves the catalog as it was. Responses carry the illustration as
//! aggregated inside that same transaction.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use illustra_core::relations::RelationKind;
use illustra_core::types::DbId;
use illustra_db::aggregator::IllustrationAggregator;
use illustra_db::models::illustration::{CreateIllustration, Illustration, UpdateIllustration};
use illustra_db::reconciler::RelationReconciler;
use validator::Validate;

use super::{not_found, unreferenced_files};
use crate::cache::ILLUSTRATIONS;
use crate::error::AppResult;
use crate::middleware::admin::Admin;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::storage::delete_best_effort;

const ENTITY: &str = "Image";

/// POST /api/v1/admin/illustrations
pub async fn create(
    State(state): State<AppState>,
    admin: Admin,
    Json(input): Json<CreateIllustration>,
) -> AppResult<(StatusCode, Json<DataResponse<Illustration>>)> {
    input.validate()?;
    let mut tx = state.store.begin().await?;
    let image = tx.create_image(&input.image).await?;

    let mut reconciler = RelationReconciler::new(&mut *tx);
    for kind in RelationKind::ALL {
        reconciler
            .reconcile(image.id, kind, input.relation_ids(kind))
            .await?;
    }

    let illustration = IllustrationAggregator::new(&mut *tx).aggregate(image).await?;
    tx.commit().await?;

    state.cache.invalidate_prefix(ILLUSTRATIONS).await;
    tracing::info!(
        image_id = illustration.image.id,
        characters = illustration.characters.len(),
        categories = illustration.categories.len(),
        operator_id = admin.operator_id,
        "Illustration created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: illustration })))
}

/// GET /api/v1/admin/illustrations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _admin: Admin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Illustration>>> {
    let mut session = state.store.session().await?;
    let illustration = IllustrationAggregator::new(&mut *session)
        .load(id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    Ok(Json(DataResponse { data: illustration }))
}

/// PUT /api/v1/admin/illustrations/{id}
///
/// Relation lists left out of the payload are not touched. Files the image
/// no longer references are removed from storage after the commit.
pub async fn update(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateIllustration>,
) -> AppResult<Json<DataResponse<Illustration>>> {
    input.validate()?;
    let mut tx = state.store.begin().await?;
    let old = tx.find_image(id).await?.ok_or_else(|| not_found(ENTITY, id))?;
    let image = tx
        .update_image(id, &input.image)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;

    let mut reconciler = RelationReconciler::new(&mut *tx);
    for kind in RelationKind::ALL {
        if let Some(ids) = input.relation_ids(kind) {
            reconciler.reconcile(id, kind, ids).await?;
        }
    }

    let illustration = IllustrationAggregator::new(&mut *tx).aggregate(image).await?;
    let current = illustration.image.stored_filenames();
    let replaced: Vec<String> = old
        .stored_filenames()
        .into_iter()
        .filter(|name| !current.contains(name))
        .map(str::to_string)
        .collect();
    let obsolete = unreferenced_files(&mut *tx, replaced).await?;
    tx.commit().await?;

    delete_best_effort(state.storage.as_ref(), &obsolete).await;

    state.cache.invalidate_prefix(ILLUSTRATIONS).await;
    tracing::info!(
        image_id = id,
        removed_files = obsolete.len(),
        operator_id = admin.operator_id,
        "Illustration updated",
    );
    Ok(Json(DataResponse { data: illustration }))
}

/// DELETE /api/v1/admin/illustrations/{id}
pub async fn delete(
    State(state): State<AppState>,
    admin: Admin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let mut tx = state.store.begin().await?;
    let image = tx.find_image(id).await?.ok_or_else(|| not_found(ENTITY, id))?;
    for kind in RelationKind::ALL {
        tx.delete_relations_by_image(kind, id).await?;
    }
    tx.delete_image(id).await?;
    let stored = image
        .stored_filenames()
        .into_iter()
        .map(str::to_string)
        .collect();
    let files = unreferenced_files(&mut *tx, stored).await?;
    tx.commit().await?;

    delete_best_effort(state.storage.as_ref(), &files).await;

    state.cache.invalidate_prefix(ILLUSTRATIONS).await;
    tracing::info!(image_id = id, operator_id = admin.operator_id, "Illustration deleted");
    Ok(StatusCode::NO_CONTENT)
}
