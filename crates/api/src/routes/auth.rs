//! Route definitions for operator authentication.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/admin/auth`.
///
/// ```text
/// POST /login    -> login
/// POST /refresh  -> refresh
/// POST /logout   -> logout (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
}
