//! Repository for the `characters` table.

use illustra_core::search::contains_pattern;
use illustra_core::types::DbId;
use sqlx::PgConnection;

use crate::models::character::{Character, CreateCharacter, UpdateCharacter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, src, filename, created_at, updated_at";

/// Provides CRUD operations for characters.
pub struct CharacterRepo;

impl CharacterRepo {
    /// Insert a new character, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateCharacter,
    ) -> Result<Character, sqlx::Error> {
        let query = format!(
            "INSERT INTO characters (name, src, filename)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(&input.name)
            .bind(&input.src)
            .bind(&input.filename)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find a character by its internal ID.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE id = $1");
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List characters ordered by name ascending.
    pub async fn list(
        conn: &mut PgConnection,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             ORDER BY name ASC, id ASC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Character>(&query)
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
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters
             WHERE name ILIKE $1 ESCAPE '\\'
             ORDER BY name ASC, id ASC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(contains_pattern(term))
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
    }

    /// Update a character. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateCharacter,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!(
            "UPDATE characters SET
                name = COALESCE($2, name),
                src = COALESCE($3, src),
                filename = COALESCE($4, filename)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.src)
            .bind(&input.filename)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Permanently delete a character by ID. Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM characters WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
