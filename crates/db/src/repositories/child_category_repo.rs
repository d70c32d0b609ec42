//! Repository for the `child_categories` table.

use illustra_core::search::contains_pattern;
use illustra_core::types::DbId;
use sqlx::PgConnection;

use crate::models::category::{ChildCategory, CreateChildCategory, UpdateChildCategory};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, parent_id, created_at, updated_at";

/// Provides CRUD operations for child categories.
pub struct ChildCategoryRepo;

impl ChildCategoryRepo {
    /// Insert a new child category, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateChildCategory,
    ) -> Result<ChildCategory, sqlx::Error> {
        let query = format!(
            "INSERT INTO child_categories (name, parent_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChildCategory>(&query)
            .bind(&input.name)
            .bind(input.parent_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a child category by its ID.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ChildCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM child_categories WHERE id = $1");
        sqlx::query_as::<_, ChildCategory>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List child categories ordered by name ascending.
    pub async fn list(
        conn: &mut PgConnection,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChildCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM child_categories
             ORDER BY name ASC, id ASC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, ChildCategory>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
    }

    /// List every child category of one parent, ordered by name.
    pub async fn list_by_parent(
        conn: &mut PgConnection,
        parent_id: DbId,
    ) -> Result<Vec<ChildCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM child_categories
             WHERE parent_id = $1
             ORDER BY name ASC, id ASC"
        );
        sqlx::query_as::<_, ChildCategory>(&query)
            .bind(parent_id)
            .fetch_all(&mut *conn)
            .await
    }

    /// Case-insensitive substring search on the name.
    pub async fn search(
        conn: &mut PgConnection,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChildCategory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM child_categories
             WHERE name ILIKE $1 ESCAPE '\\'
             ORDER BY name ASC, id ASC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ChildCategory>(&query)
            .bind(contains_pattern(term))
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
    }

    /// Update a child category. Only non-`None` fields in `input` are applied.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateChildCategory,
    ) -> Result<Option<ChildCategory>, sqlx::Error> {
        let query = format!(
            "UPDATE child_categories SET
                name = COALESCE($2, name),
                parent_id = COALESCE($3, parent_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChildCategory>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.parent_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Delete a child category. Its join rows must already be gone.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM child_categories WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
