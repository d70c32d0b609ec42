//! Repository for the `parent_categories` table.

use illustra_core::search::contains_pattern;
use illustra_core::types::DbId;
use sqlx::PgConnection;

use crate::models::category::{CreateParentCategory, ParentCategory, UpdateParentCategory};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, src, filename, created_at, updated_at";

/// Provides CRUD operations for parent categories.
pub struct ParentCategoryRepo;

impl ParentCategoryRepo {
    /// Insert a new parent category, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateParentCategory,
    ) -> Result<ParentCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO parent_categories (name, src, filename)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParentCategory>(&query)
            .bind(&input.name)
            .bind(&input.src)
            .bind(&input.filename)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a parent category by its ID.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ParentCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM parent_categories WHERE id = $1");
        sqlx::query_as::<_, ParentCategory>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List parent categories ordered by name ascending.
    pub async fn list(
        conn: &mut PgConnection,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ParentCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM parent_categories
             ORDER BY name ASC, id ASC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, ParentCategory>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
    }

    /// Case-insensitive substring search on the name.
    pub async fn search(
        conn: &mut PgConnection,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ParentCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM parent_categories
             WHERE name ILIKE $1 ESCAPE '\\'
             ORDER BY name ASC, id ASC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ParentCategory>(&query)
            .bind(contains_pattern(term))
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
    }

    /// Update a parent category. Only non-`None` fields in `input` are applied.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateParentCategory,
    ) -> Result<Option<ParentCategory>, sqlx::Error> {
        let query = format!(
            "UPDATE parent_categories SET
                name = COALESCE($2, name),
                src = COALESCE($3, src),
                filename = COALESCE($4, filename)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParentCategory>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.src)
            .bind(&input.filename)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Delete a parent category. Its child categories must already be gone.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM parent_categories WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
