//! Public, unauthenticated browsing routes.

use axum::routing::get;
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Routes merged at the `/api/v1` root.
///
/// ```text
/// GET /illustrations                               -> list_illustrations
/// GET /illustrations/search                        -> search_illustrations
/// GET /illustrations/by-character/{id}             -> illustrations_by_character
/// GET /illustrations/by-category/{parent_id}       -> illustrations_by_category
/// GET /illustrations/by-child-category/{child_id}  -> illustrations_by_child_category
/// GET /illustrations/{id}                          -> get_illustration
/// GET /characters                                  -> list_characters
/// GET /characters/{id}                             -> get_character
/// GET /categories                                  -> category_tree
/// GET /categories/{id}                             -> get_category
/// ```
pub fn router() -> Router<AppState> {
    let illustration_routes = Router::new()
        .route("/", get(catalog::list_illustrations))
        .route("/search", get(catalog::search_illustrations))
        .route(
            "/by-character/{id}",
            get(catalog::illustrations_by_character),
        )
        .route(
            "/by-category/{parent_id}",
            get(catalog::illustrations_by_category),
        )
        .route(
            "/by-child-category/{child_id}",
            get(catalog::illustrations_by_child_category),
        )
        .route("/{id}", get(catalog::get_illustration));

    Router::new()
        .nest("/illustrations", illustration_routes)
        .route("/characters", get(catalog::list_characters))
        .route("/characters/{id}", get(catalog::get_character))
        .route("/categories", get(catalog::category_tree))
        .route("/categories/{id}", get(catalog::get_category))
}
