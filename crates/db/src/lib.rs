//! Persistence layer for the illustration catalog.
//!
//! - [`models`] -- row structs, DTOs, and read-model aggregates.
//! - [`repositories`] -- zero-sized repos issuing SQL over a `PgConnection`.
//! - [`store`] -- the [`store::CatalogStore`] / [`store::CatalogSession`]
//!   abstraction with Postgres and in-memory implementations.
//! - [`reconciler`] and [`aggregator`] -- relation sync and illustration
//!   assembly, written against [`store::CatalogSession`].

use sqlx::postgres::PgPoolOptions;

pub mod aggregator;
pub mod error;
pub mod models;
pub mod reconciler;
pub mod repositories;
pub mod store;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Apply all pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
