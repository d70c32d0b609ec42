//! Operator (catalog administrator) model and DTOs.

use illustra_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full operator row from the `operators` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`OperatorResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Operator {
    pub id: DbId,
    pub name: String,
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe operator representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct OperatorResponse {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}

impl From<Operator> for OperatorResponse {
    fn from(operator: Operator) -> Self {
        Self {
            id: operator.id,
            name: operator.name,
            created_at: operator.created_at,
        }
    }
}

/// DTO for creating a new operator. The password is already hashed.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOperator {
    pub name: String,
    pub password_hash: String,
}
