//! Image join-row model shared by the three relation tables.

use illustra_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from `image_characters`, `image_parent_categories`, or
/// `image_child_categories`.
///
/// The related-entity column differs per table and is aliased to
/// `related_id` by the repository.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ImageRelation {
    pub id: DbId,
    pub image_id: DbId,
    pub related_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
