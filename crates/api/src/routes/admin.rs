//! Route definitions for catalog management (admin only).
//!
//! Every handler behind these routes takes the
//! [`Admin`](crate::middleware::admin::Admin) extractor, so each request
//! needs an access token whose session is still live.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::config::ServerConfig;
use crate::handlers::{
    characters, child_categories, illustrations, operators, parent_categories, uploads,
};
use crate::state::AppState;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Routes mounted at `/admin`.
///
/// ```text
/// POST   /operators                                   -> operators::create
///
/// GET    /characters                                  -> list
/// POST   /characters                                  -> create
/// GET    /characters/search                           -> search
/// GET    /characters/{id}                             -> get_by_id
/// PUT    /characters/{id}                             -> update
/// DELETE /characters/{id}                             -> delete
///
/// (same shape for /parent-categories and /child-categories)
/// GET    /parent-categories/{id}/child-categories     -> list_children
///
/// POST   /illustrations                               -> create
/// GET    /illustrations/{id}                          -> get_by_id
/// PUT    /illustrations/{id}                          -> update
/// DELETE /illustrations/{id}                          -> delete
///
/// POST   /uploads                                     -> upload_image
/// ```
pub fn router(config: &ServerConfig) -> Router<AppState> {
    let character_routes = Router::new()
        .route("/", get(characters::list).post(characters::create))
        .route("/search", get(characters::search))
        .route(
            "/{id}",
            get(characters::get_by_id)
                .put(characters::update)
                .delete(characters::delete),
        );

    let parent_category_routes = Router::new()
        .route(
            "/",
            get(parent_categories::list).post(parent_categories::create),
        )
        .route("/search", get(parent_categories::search))
        .route(
            "/{id}",
            get(parent_categories::get_by_id)
                .put(parent_categories::update)
                .delete(parent_categories::delete),
        )
        .route(
            "/{id}/child-categories",
            get(parent_categories::list_children),
        );

    let child_category_routes = Router::new()
        .route(
            "/",
            get(child_categories::list).post(child_categories::create),
        )
        .route("/search", get(child_categories::search))
        .route(
            "/{id}",
            get(child_categories::get_by_id)
                .put(child_categories::update)
                .delete(child_categories::delete),
        );

    let illustration_routes = Router::new()
        .route("/", post(illustrations::create))
        .route(
            "/{id}",
            get(illustrations::get_by_id)
                .put(illustrations::update)
                .delete(illustrations::delete),
        );

    let upload_routes = Router::new()
        .route("/", post(uploads::upload_image))
        .layer(DefaultBodyLimit::max(
            config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES,
        ));

    Router::new()
        .route("/operators", post(operators::create))
        .nest("/characters", character_routes)
        .nest("/parent-categories", parent_category_routes)
        .nest("/child-categories", child_category_routes)
        .nest("/illustrations", illustration_routes)
        .nest("/uploads", upload_routes)
}
