//! Parent and child category models and DTOs.
//!
//! Categories form a two-level tree: every child category belongs to
//! exactly one parent category through `parent_id`.

use illustra_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// ---------------------------------------------------------------------------
// Parent categories
// ---------------------------------------------------------------------------

/// A row from the `parent_categories` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ParentCategory {
    pub id: DbId,
    pub name: String,
    pub src: String,
    pub filename: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a parent category.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateParentCategory {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1))]
    pub src: String,
    pub filename: Option<String>,
}

/// DTO for updating a parent category. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateParentCategory {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub src: Option<String>,
    pub filename: Option<String>,
}

// ---------------------------------------------------------------------------
// Child categories
// ---------------------------------------------------------------------------

/// A row from the `child_categories` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ChildCategory {
    pub id: DbId,
    pub name: String,
    pub parent_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a child category.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChildCategory {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub parent_id: DbId,
}

/// DTO for updating a child category. Moving it to another parent is allowed.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateChildCategory {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub parent_id: Option<DbId>,
}
