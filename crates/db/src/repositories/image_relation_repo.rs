//! Repository for the three image join tables.
//!
//! Table and column names come from [`RelationKind`], which only yields
//! static identifiers, so interpolating them into SQL is safe.

use illustra_core::relations::RelationKind;
use illustra_core::types::DbId;
use sqlx::PgConnection;

use crate::models::relation::ImageRelation;

/// Provides join-row operations for every [`RelationKind`].
pub struct ImageRelationRepo;

impl ImageRelationRepo {
    /// List the join rows of one image, oldest first.
    pub async fn list_by_image(
        conn: &mut PgConnection,
        kind: RelationKind,
        image_id: DbId,
    ) -> Result<Vec<ImageRelation>, sqlx::Error> {
        let query = format!(
            "SELECT id, image_id, {column} AS related_id, created_at, updated_at
             FROM {table}
             WHERE image_id = $1
             ORDER BY id ASC",
            table = kind.table(),
            column = kind.related_column(),
        );
        sqlx::query_as::<_, ImageRelation>(&query)
            .bind(image_id)
            .fetch_all(&mut *conn)
            .await
    }

    /// Link an image to a related entity, returning the new join row.
    pub async fn create(
        conn: &mut PgConnection,
        kind: RelationKind,
        image_id: DbId,
        related_id: DbId,
    ) -> Result<ImageRelation, sqlx::Error> {
        let query = format!(
            "INSERT INTO {table} (image_id, {column})
             VALUES ($1, $2)
             RETURNING id, image_id, {column} AS related_id, created_at, updated_at",
            table = kind.table(),
            column = kind.related_column(),
        );
        sqlx::query_as::<_, ImageRelation>(&query)
            .bind(image_id)
            .bind(related_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Delete one join row by its own ID. Returns `true` if a row was removed.
    pub async fn delete(
        conn: &mut PgConnection,
        kind: RelationKind,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&query).bind(id).execute(&mut *conn).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every join row of one image. Returns the count removed.
    pub async fn delete_by_image(
        conn: &mut PgConnection,
        kind: RelationKind,
        image_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let query = format!("DELETE FROM {} WHERE image_id = $1", kind.table());
        let result = sqlx::query(&query)
            .bind(image_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete every join row pointing at one related entity.
    pub async fn delete_by_related(
        conn: &mut PgConnection,
        kind: RelationKind,
        related_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let query = format!(
            "DELETE FROM {table} WHERE {column} = $1",
            table = kind.table(),
            column = kind.related_column(),
        );
        let result = sqlx::query(&query)
            .bind(related_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
