//! Repository for the `images` table.

use illustra_core::relations::RelationKind;
use illustra_core::search::contains_pattern;
use illustra_core::types::DbId;
use sqlx::PgConnection;

use crate::models::image::{CreateImage, Image, UpdateImage};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, original_src, simple_src, original_filename, simple_filename, \
                       created_at, updated_at";

/// Provides CRUD, listing, and search for images.
pub struct ImageRepo;

impl ImageRepo {
    /// Insert a new image, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateImage,
    ) -> Result<Image, sqlx::Error> {
        let query = format!(
            "INSERT INTO images
                 (title, original_src, simple_src, original_filename, simple_filename)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(&input.title)
            .bind(&input.original_src)
            .bind(&input.simple_src)
            .bind(&input.original_filename)
            .bind(&input.simple_filename)
            .fetch_one(&mut *conn)
            .await
    }

    /// Find an image by its ID.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Image>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM images WHERE id = $1");
        sqlx::query_as::<_, Image>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// List images, newest first.
    pub async fn list(
        conn: &mut PgConnection,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Image>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM images
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
    }

    /// Case-insensitive substring search on the title, newest first.
    pub async fn search(
        conn: &mut PgConnection,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Image>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM images
             WHERE title ILIKE $1 ESCAPE '\\'
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(contains_pattern(term))
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
    }

    /// List images linked to one related entity through the `kind` join table.
    pub async fn list_by_related(
        conn: &mut PgConnection,
        kind: RelationKind,
        related_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Image>, sqlx::Error> {
        let query = format!(
            "SELECT i.id, i.title, i.original_src, i.simple_src, i.original_filename, \
                    i.simple_filename, i.created_at, i.updated_at
             FROM images i
             JOIN {table} r ON r.image_id = i.id
             WHERE r.{column} = $1
             ORDER BY i.created_at DESC, i.id DESC
             LIMIT $2 OFFSET $3",
            table = kind.table(),
            column = kind.related_column(),
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(related_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
    }

    /// Update an image. Only non-`None` fields in `input` are applied.
    ///
    /// `simple_src` and `simple_filename` are written whenever the outer
    /// `Option` is `Some`, so `Some(None)` clears them.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateImage,
    ) -> Result<Option<Image>, sqlx::Error> {
        let query = format!(
            "UPDATE images SET
                title = COALESCE($2, title),
                original_src = COALESCE($3, original_src),
                simple_src = CASE WHEN $4 THEN $5 ELSE simple_src END,
                original_filename = COALESCE($6, original_filename),
                simple_filename = CASE WHEN $7 THEN $8 ELSE simple_filename END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Image>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.original_src)
            .bind(input.simple_src.is_some())
            .bind(input.simple_src.as_ref().and_then(|v| v.as_deref()))
            .bind(&input.original_filename)
            .bind(input.simple_filename.is_some())
            .bind(input.simple_filename.as_ref().and_then(|v| v.as_deref()))
            .fetch_optional(&mut *conn)
            .await
    }

    /// Delete an image by ID. Join rows must already be gone.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM images WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
