//! Error types for the store abstraction and the catalog services built on it.

use illustra_core::relations::{RelationKind, RelationOp};
use illustra_core::types::DbId;

/// Failure reported by a [`crate::store::CatalogSession`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An error from the Postgres driver.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A write referenced a row that does not exist.
    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    /// A write would duplicate a unique key.
    #[error("Unique violation: {0}")]
    Unique(String),

    /// The backing store could not serve the request.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a reconciliation or aggregation pass.
///
/// Every variant records which step failed so the caller can log it
/// meaningfully before mapping it to a response.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Listing, creating, or deleting join rows failed.
    #[error("Failed to {op} {kind} relations of image {image_id}: {source}")]
    Relation {
        op: RelationOp,
        kind: RelationKind,
        image_id: DbId,
        #[source]
        source: StoreError,
    },

    /// Fetching a related entity while assembling an illustration failed.
    #[error("Failed to fetch {entity} {id}: {source}")]
    Fetch {
        entity: &'static str,
        id: DbId,
        #[source]
        source: StoreError,
    },

    /// Any other store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CatalogError {
    /// The underlying store error, whichever step produced it.
    pub fn store_error(&self) -> &StoreError {
        match self {
            CatalogError::Relation { source, .. } | CatalogError::Fetch { source, .. } => source,
            CatalogError::Store(source) => source,
        }
    }
}
