//! Character entity model and DTOs.

use illustra_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A character row from the `characters` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Character {
    pub id: DbId,
    pub name: String,
    pub src: String,
    pub filename: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new character.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCharacter {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1))]
    pub src: String,
    pub filename: Option<String>,
}

/// DTO for updating an existing character. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCharacter {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub src: Option<String>,
    pub filename: Option<String>,
}
