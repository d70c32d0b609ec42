//! Extractor guarding the admin API.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use illustra_core::error::CoreError;
use illustra_core::types::DbId;

use crate::auth::tokens::verify_access_token;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// An operator presenting a live access token.
///
/// Rejects with 401 when the `Authorization: Bearer` header is missing or
/// malformed, when the token fails verification, and when the session it
/// was issued under has been revoked or has expired.
///
/// ```ignore
/// async fn handler(admin: Admin) -> AppResult<StatusCode> {
///     tracing::info!(operator_id = admin.operator_id, "handling request");
///     Ok(StatusCode::NO_CONTENT)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Admin {
    pub operator_id: DbId,
    pub session_id: DbId,
}

impl FromRequestParts<AppState> for Admin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verify_access_token(&state.config.tokens, bearer_token(parts)?)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected access token");
                unauthorized("Invalid or expired token")
            })?;

        let mut session = state.store.session().await?;
        if !session.is_session_active(claims.sid).await? {
            return Err(unauthorized("Session has ended, sign in again"));
        }

        Ok(Admin {
            operator_id: claims.sub,
            session_id: claims.sid,
        })
    }
}

fn bearer_token(parts: &Parts) -> AppResult<&str> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;
    let value = header
        .to_str()
        .map_err(|_| unauthorized("Authorization header is not valid text"))?;
    let token = value
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty());
    token.ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}
