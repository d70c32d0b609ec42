//! Public, read-only browsing handlers.
//!
//! Every response body is cached under its resource prefix plus the request
//! path and query, so `?limit=` and `?offset=` variants are cached apart.
//! Admin mutations drop the affected prefixes.

use axum::extract::{OriginalUri, Path, Query, State};
use axum::Json;
use illustra_core::pagination::MAX_LIMIT;
use illustra_core::relations::RelationKind;
use illustra_core::types::DbId;
use illustra_db::aggregator::IllustrationAggregator;
use illustra_db::models::illustration::{Category, Illustration};
use illustra_db::store::CatalogSession;
use serde::Serialize;
use serde_json::Value;

use super::{not_found, search_term};
use crate::cache::{FillTicket, Lookup, CATEGORIES, CHARACTERS, ILLUSTRATIONS};
use crate::error::{AppError, AppResult};
use crate::query::{PaginationParams, SearchParams};
use crate::response::DataResponse;
use crate::state::AppState;

fn cache_key(prefix: &str, uri: &OriginalUri) -> String {
    format!("{prefix}{}", uri.0)
}

/// Wrap `data` in the response envelope and offer it to the cache.
async fn cache_and_respond<T: Serialize>(
    state: &AppState,
    ticket: FillTicket,
    data: T,
) -> AppResult<Json<Value>> {
    let body = serde_json::to_value(DataResponse { data })
        .map_err(|e| AppError::InternalError(format!("Failed to serialize response: {e}")))?;
    state.cache.fill(ticket, body.clone()).await;
    Ok(Json(body))
}

async fn lookup(state: &AppState, prefix: &str, uri: &OriginalUri) -> Lookup {
    let lookup = state.cache.lookup(cache_key(prefix, uri)).await;
    if let Lookup::Hit(_) = lookup {
        tracing::debug!(prefix, "Response cache hit");
    }
    lookup
}

// ---------------------------------------------------------------------------
// Illustrations
// ---------------------------------------------------------------------------

/// GET /api/v1/illustrations
pub async fn list_illustrations(
    State(state): State<AppState>,
    uri: OriginalUri,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Value>> {
    let ticket = match lookup(&state, ILLUSTRATIONS, &uri).await {
        Lookup::Hit(body) => return Ok(Json(body)),
        Lookup::Miss(ticket) => ticket,
    };

    let (limit, offset) = params.bounds();
    let mut session = state.store.session().await?;
    let images = session.list_images(limit, offset).await?;
    let illustrations = IllustrationAggregator::new(&mut *session)
        .aggregate_all(images)
        .await?;
    cache_and_respond(&state, ticket, illustrations).await
}

/// GET /api/v1/illustrations/{id}
pub async fn get_illustration(
    State(state): State<AppState>,
    uri: OriginalUri,
    Path(id): Path<DbId>,
) -> AppResult<Json<Value>> {
    let ticket = match lookup(&state, ILLUSTRATIONS, &uri).await {
        Lookup::Hit(body) => return Ok(Json(body)),
        Lookup::Miss(ticket) => ticket,
    };

    let mut session = state.store.session().await?;
    let illustration = IllustrationAggregator::new(&mut *session)
        .load(id)
        .await?
        .ok_or_else(|| not_found("Image", id))?;
    cache_and_respond(&state, ticket, illustration).await
}

/// GET /api/v1/illustrations/search?q=
pub async fn search_illustrations(
    State(state): State<AppState>,
    uri: OriginalUri,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Value>> {
    let term = search_term(&params.q)?;
    let ticket = match lookup(&state, ILLUSTRATIONS, &uri).await {
        Lookup::Hit(body) => return Ok(Json(body)),
        Lookup::Miss(ticket) => ticket,
    };

    let (limit, offset) = params.bounds();
    let mut session = state.store.session().await?;
    let images = session.search_images(&term, limit, offset).await?;
    let illustrations = IllustrationAggregator::new(&mut *session)
        .aggregate_all(images)
        .await?;
    cache_and_respond(&state, ticket, illustrations).await
}

/// Illustrations linked to one related entity, 404 if that entity is missing.
async fn illustrations_by_related(
    session: &mut dyn CatalogSession,
    kind: RelationKind,
    related_id: DbId,
    params: &PaginationParams,
) -> AppResult<Vec<Illustration>> {
    let exists = match kind {
        RelationKind::Character => session.find_character(related_id).await?.is_some(),
        RelationKind::ParentCategory => {
            session.find_parent_category(related_id).await?.is_some()
        }
        RelationKind::ChildCategory => session.find_child_category(related_id).await?.is_some(),
    };
    if !exists {
        return Err(not_found(kind.entity(), related_id));
    }

    let (limit, offset) = params.bounds();
    let images = session
        .list_images_by_related(kind, related_id, limit, offset)
        .await?;
    Ok(IllustrationAggregator::new(session)
        .aggregate_all(images)
        .await?)
}

/// GET /api/v1/illustrations/by-character/{id}
pub async fn illustrations_by_character(
    State(state): State<AppState>,
    uri: OriginalUri,
    Path(id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Value>> {
    let ticket = match lookup(&state, ILLUSTRATIONS, &uri).await {
        Lookup::Hit(body) => return Ok(Json(body)),
        Lookup::Miss(ticket) => ticket,
    };

    let mut session = state.store.session().await?;
    let illustrations =
        illustrations_by_related(&mut *session, RelationKind::Character, id, &params).await?;
    cache_and_respond(&state, ticket, illustrations).await
}

/// GET /api/v1/illustrations/by-category/{parent_id}
pub async fn illustrations_by_category(
    State(state): State<AppState>,
    uri: OriginalUri,
    Path(parent_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Value>> {
    let ticket = match lookup(&state, ILLUSTRATIONS, &uri).await {
        Lookup::Hit(body) => return Ok(Json(body)),
        Lookup::Miss(ticket) => ticket,
    };

    let mut session = state.store.session().await?;
    let illustrations = illustrations_by_related(
        &mut *session,
        RelationKind::ParentCategory,
        parent_id,
        &params,
    )
    .await?;
    cache_and_respond(&state, ticket, illustrations).await
}

/// GET /api/v1/illustrations/by-child-category/{child_id}
pub async fn illustrations_by_child_category(
    State(state): State<AppState>,
    uri: OriginalUri,
    Path(child_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Value>> {
    let ticket = match lookup(&state, ILLUSTRATIONS, &uri).await {
        Lookup::Hit(body) => return Ok(Json(body)),
        Lookup::Miss(ticket) => ticket,
    };

    let mut session = state.store.session().await?;
    let illustrations = illustrations_by_related(
        &mut *session,
        RelationKind::ChildCategory,
        child_id,
        &params,
    )
    .await?;
    cache_and_respond(&state, ticket, illustrations).await
}

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

/// GET /api/v1/characters
pub async fn list_characters(
    State(state): State<AppState>,
    uri: OriginalUri,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Value>> {
    let ticket = match lookup(&state, CHARACTERS, &uri).await {
        Lookup::Hit(body) => return Ok(Json(body)),
        Lookup::Miss(ticket) => ticket,
    };

    let (limit, offset) = params.bounds();
    let mut session = state.store.session().await?;
    let characters = session.list_characters(limit, offset).await?;
    cache_and_respond(&state, ticket, characters).await
}

/// GET /api/v1/characters/{id}
pub async fn get_character(
    State(state): State<AppState>,
    uri: OriginalUri,
    Path(id): Path<DbId>,
) -> AppResult<Json<Value>> {
    let ticket = match lookup(&state, CHARACTERS, &uri).await {
        Lookup::Hit(body) => return Ok(Json(body)),
        Lookup::Miss(ticket) => ticket,
    };

    let mut session = state.store.session().await?;
    let character = session
        .find_character(id)
        .await?
        .ok_or_else(|| not_found("Character", id))?;
    cache_and_respond(&state, ticket, character).await
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// GET /api/v1/categories
///
/// Every parent category, each with all of its child categories.
pub async fn category_tree(
    State(state): State<AppState>,
    uri: OriginalUri,
) -> AppResult<Json<Value>> {
    let ticket = match lookup(&state, CATEGORIES, &uri).await {
        Lookup::Hit(body) => return Ok(Json(body)),
        Lookup::Miss(ticket) => ticket,
    };

    let mut session = state.store.session().await?;
    let mut parents = Vec::new();
    loop {
        let page = session
            .list_parent_categories(MAX_LIMIT, parents.len() as i64)
            .await?;
        let last_page = (page.len() as i64) < MAX_LIMIT;
        parents.extend(page);
        if last_page {
            break;
        }
    }

    let mut tree = Vec::with_capacity(parents.len());
    for parent_category in parents {
        let child_category = session
            .list_child_categories_by_parent(parent_category.id)
            .await?;
        tree.push(Category {
            parent_category,
            child_category,
        });
    }
    cache_and_respond(&state, ticket, tree).await
}

/// GET /api/v1/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    uri: OriginalUri,
    Path(id): Path<DbId>,
) -> AppResult<Json<Value>> {
    let ticket = match lookup(&state, CATEGORIES, &uri).await {
        Lookup::Hit(body) => return Ok(Json(body)),
        Lookup::Miss(ticket) => ticket,
    };

    let mut session = state.store.session().await?;
    let parent_category = session
        .find_parent_category(id)
        .await?
        .ok_or_else(|| not_found("ParentCategory", id))?;
    let child_category = session.list_child_categories_by_parent(id).await?;
    cache_and_respond(
        &state,
        ticket,
        Category {
            parent_category,
            child_category,
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_keeps_path_and_query() {
        let uri = OriginalUri("/api/v1/illustrations?limit=5&offset=10".parse().unwrap());
        assert_eq!(
            cache_key(ILLUSTRATIONS, &uri),
            "illustrations:/api/v1/illustrations?limit=5&offset=10"
        );
    }
}
