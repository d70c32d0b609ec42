//! Handlers for operator sign-in.
//!
//! Each login or refresh opens an `operator_sessions` row; the access token
//! returned with it is bound to that row and dies with it.

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use illustra_core::error::CoreError;
use illustra_db::models::operator::{Operator, OperatorResponse};
use illustra_db::models::session::CreateSession;
use illustra_db::store::CatalogSession;
use serde::{Deserialize, Serialize};

use crate::auth::password::password_matches;
use crate::auth::tokens::{refresh_token_digest, sign_access_token, RefreshToken};
use crate::error::{AppError, AppResult};
use crate::middleware::admin::Admin;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

/// Request body for `POST /admin/auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub operator: OperatorResponse,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid name or password".into(),
    ))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/admin/auth/login
///
/// Authenticate with name + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let mut session = state.store.session().await?;

    let operator = session
        .find_operator_by_name(&input.name)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !password_matches(&operator, &input.password)? {
        tracing::info!(operator = %input.name, "Rejected operator login");
        return Err(invalid_credentials());
    }

    let response = open_session(&state, &mut *session, operator, user_agent(&headers)).await?;
    tracing::info!(operator_id = response.operator.id, "Operator logged in");
    Ok(Json(response))
}

/// POST /api/v1/admin/auth/refresh
///
/// Exchange a valid refresh token for a new session. The old session is
/// revoked in the same transaction, which also retires its access token.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let digest = refresh_token_digest(&input.refresh_token);
    let mut tx = state.store.begin().await?;

    let old = tx.find_active_session(&digest).await?.ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid or expired refresh token".into(),
        ))
    })?;
    tx.revoke_session(old.id).await?;

    let operator = tx.find_operator(old.operator_id).await?.ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized("Operator no longer exists".into()))
    })?;

    let response = open_session(&state, &mut *tx, operator, user_agent(&headers)).await?;
    tx.commit().await?;
    tracing::debug!(operator_id = response.operator.id, old_session_id = old.id, "Session rotated");
    Ok(Json(response))
}

/// POST /api/v1/admin/auth/logout
///
/// Revoke every session of the calling operator, signing them out on all
/// devices at once. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, admin: Admin) -> AppResult<StatusCode> {
    let mut session = state.store.session().await?;
    let revoked = session.revoke_operator_sessions(admin.operator_id).await?;
    tracing::info!(
        operator_id = admin.operator_id,
        session_id = admin.session_id,
        revoked,
        "Operator logged out",
    );
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Store a new session for `operator` and mint the token pair bound to it.
async fn open_session(
    state: &AppState,
    session: &mut dyn CatalogSession,
    operator: Operator,
    user_agent: Option<String>,
) -> AppResult<AuthResponse> {
    let tokens = &state.config.tokens;
    let refresh = RefreshToken::generate();
    let row = session
        .create_session(&CreateSession {
            operator_id: operator.id,
            refresh_token_hash: refresh.digest,
            user_agent,
            expires_at: Utc::now() + tokens.refresh_ttl,
        })
        .await?;

    let access_token = sign_access_token(tokens, operator.id, row.id)
        .map_err(|e| AppError::InternalError(format!("Token signing error: {e}")))?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh.secret,
        expires_in: tokens.access_ttl.num_seconds(),
        operator: operator.into(),
    })
}
