pub mod admin;
pub mod auth;
pub mod catalog;
pub mod health;

use axum::Router;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /illustrations                                   list (public, cached)
/// /illustrations/search                            search by title (?q=)
/// /illustrations/by-character/{id}                 list by character
/// /illustrations/by-category/{parent_id}           list by parent category
/// /illustrations/by-child-category/{child_id}      list by child category
/// /illustrations/{id}                              get
/// /characters                                      list (public, cached)
/// /characters/{id}                                 get
/// /categories                                      category tree (public, cached)
/// /categories/{id}                                 parent with its children
///
/// /admin/auth/login                                login (public)
/// /admin/auth/refresh                              refresh (public)
/// /admin/auth/logout                               logout (requires auth)
///
/// /admin/operators                                 create (admin only)
/// /admin/characters                                list, create
/// /admin/characters/search                         search (?q=)
/// /admin/characters/{id}                           get, update, delete
/// /admin/parent-categories                         list, create
/// /admin/parent-categories/search                  search (?q=)
/// /admin/parent-categories/{id}                    get, update, delete (cascades)
/// /admin/parent-categories/{id}/child-categories   list children
/// /admin/child-categories                          list, create
/// /admin/child-categories/search                   search (?q=)
/// /admin/child-categories/{id}                     get, update, delete
/// /admin/illustrations                             create
/// /admin/illustrations/{id}                        get, update, delete
/// /admin/uploads                                   upload image (multipart)
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        // Public browsing.
        .merge(catalog::router())
        // Operator authentication (login, refresh, logout).
        .nest("/admin/auth", auth::router())
        // Catalog management (admin only).
        .nest("/admin", admin::router(config))
}
