//! Lookups over the stored-file columns of `images`, `characters`, and
//! `parent_categories`.

use sqlx::PgConnection;

/// Answers whether an uploaded object is still in use.
pub struct StoredFileRepo;

impl StoredFileRepo {
    /// Whether any row names `filename` as one of its stored files.
    pub async fn is_referenced(
        conn: &mut PgConnection,
        filename: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM images
                            WHERE original_filename = $1 OR simple_filename = $1)
                 OR EXISTS (SELECT 1 FROM characters WHERE filename = $1)
                 OR EXISTS (SELECT 1 FROM parent_categories WHERE filename = $1)",
        )
        .bind(filename)
        .fetch_one(&mut *conn)
        .await
    }
}
