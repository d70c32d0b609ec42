//! Handlers for the `/admin/operators` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use illustra_core::error::CoreError;
use illustra_db::models::operator::{CreateOperator, OperatorResponse};
use illustra_db::store::CatalogStore;
use serde::Deserialize;

use crate::auth::password::hash_new_password;
use crate::error::{AppError, AppResult};
use crate::middleware::admin::Admin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/operators`.
#[derive(Debug, Deserialize)]
pub struct CreateOperatorRequest {
    pub name: String,
    pub password: String,
}

/// POST /api/v1/admin/operators
pub async fn create(
    State(state): State<AppState>,
    admin: Admin,
    Json(input): Json<CreateOperatorRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<OperatorResponse>>)> {
    let input = new_operator(&input.name, &input.password)?;
    let mut session = state.store.session().await?;
    let operator = session.create_operator(&input).await?;

    tracing::info!(
        operator_id = operator.id,
        created_by = admin.operator_id,
        "Operator created",
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: operator.into(),
        }),
    ))
}

/// Create the operator `name` unless one already exists.
///
/// Used at startup to seed the first operator. Returns `true` when a new
/// operator was inserted.
pub async fn ensure_operator(
    store: &dyn CatalogStore,
    name: &str,
    password: &str,
) -> AppResult<bool> {
    let name = name.trim();
    let mut session = store.session().await?;
    if session.find_operator_by_name(name).await?.is_some() {
        return Ok(false);
    }
    let input = new_operator(name, password)?;
    session.create_operator(&input).await?;
    Ok(true)
}

fn new_operator(name: &str, password: &str) -> AppResult<CreateOperator> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Operator name must not be blank".into(),
        )));
    }
    Ok(CreateOperator {
        name: name.to_string(),
        password_hash: hash_new_password(password)?,
    })
}
