//! Operator refresh-token session model and DTOs.

use illustra_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A session row from the `operator_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct OperatorSession {
    pub id: DbId,
    pub operator_id: DbId,
    pub refresh_token_hash: String,
    pub user_agent: Option<String>,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new operator session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub operator_id: DbId,
    pub refresh_token_hash: String,
    pub user_agent: Option<String>,
    pub expires_at: Timestamp,
}
