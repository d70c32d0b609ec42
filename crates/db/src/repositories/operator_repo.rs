//! Repository for the `operators` table.

use illustra_core::types::DbId;
use sqlx::PgConnection;

use crate::models::operator::{CreateOperator, Operator};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, password_hash, created_at, updated_at";

/// Provides lookups and creation for operator accounts.
pub struct OperatorRepo;

impl OperatorRepo {
    /// Insert a new operator, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateOperator,
    ) -> Result<Operator, sqlx::Error> {
        let query = format!(
            "INSERT INTO operators (name, password_hash)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Operator>(&query)
            .bind(&input.name)
            .bind(&input.password_hash)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find an operator by ID.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Operator>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM operators WHERE id = $1");
        sqlx::query_as::<_, Operator>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Find an operator by login name.
    pub async fn find_by_name(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<Operator>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM operators WHERE name = $1");
        sqlx::query_as::<_, Operator>(&query)
            .bind(name)
            .fetch_optional(&mut *conn)
            .await
    }
}
