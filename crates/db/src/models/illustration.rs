//! Illustration read model and the mutation DTOs that carry relation sets.
//!
//! An [`Illustration`] is one [`Image`] with the characters and categories
//! linked to it. Each [`Category`] pairs a parent category with the child
//! categories that belong to it and are linked to the same image.

use illustra_core::relations::RelationKind;
use illustra_core::types::DbId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::category::{ChildCategory, ParentCategory};
use super::character::Character;
use super::image::{CreateImage, Image, UpdateImage};

// ---------------------------------------------------------------------------
// Aggregates (never persisted)
// ---------------------------------------------------------------------------

/// A parent category with its child categories.
///
/// In an [`Illustration`] the children are limited to those linked to the
/// illustration's image; in the category tree they are all children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub parent_category: ParentCategory,
    pub child_category: Vec<ChildCategory>,
}

/// An image with all of its resolved relations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Illustration {
    pub image: Image,
    pub characters: Vec<Character>,
    pub categories: Vec<Category>,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating an illustration: the image fields plus its relations.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateIllustration {
    #[serde(flatten)]
    #[validate(nested)]
    pub image: CreateImage,
    #[serde(default)]
    pub character_ids: Vec<DbId>,
    #[serde(default)]
    pub parent_category_ids: Vec<DbId>,
    #[serde(default)]
    pub child_category_ids: Vec<DbId>,
}

impl CreateIllustration {
    /// Desired related ids for `kind`.
    pub fn relation_ids(&self, kind: RelationKind) -> &[DbId] {
        match kind {
            RelationKind::Character => &self.character_ids,
            RelationKind::ParentCategory => &self.parent_category_ids,
            RelationKind::ChildCategory => &self.child_category_ids,
        }
    }
}

/// DTO for editing an illustration.
///
/// A relation list that is `None` leaves that relation kind unchanged;
/// `Some(vec![])` unlinks every entity of that kind.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateIllustration {
    #[serde(flatten)]
    #[validate(nested)]
    pub image: UpdateImage,
    pub character_ids: Option<Vec<DbId>>,
    pub parent_category_ids: Option<Vec<DbId>>,
    pub child_category_ids: Option<Vec<DbId>>,
}

impl UpdateIllustration {
    /// Desired related ids for `kind`, if the caller supplied them.
    pub fn relation_ids(&self, kind: RelationKind) -> Option<&[DbId]> {
        match kind {
            RelationKind::Character => self.character_ids.as_deref(),
            RelationKind::ParentCategory => self.parent_category_ids.as_deref(),
            RelationKind::ChildCategory => self.child_category_ids.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_payload_flattens_image_fields() {
        let input: CreateIllustration = serde_json::from_value(serde_json::json!({
            "title": "Harvest",
            "original_src": "/static/images/a.png",
            "character_ids": [1, 2],
        }))
        .unwrap();

        assert_eq!(input.image.title, "Harvest");
        assert_eq!(input.relation_ids(RelationKind::Character), &[1, 2]);
        assert!(input.relation_ids(RelationKind::ChildCategory).is_empty());
    }

    #[test]
    fn update_payload_distinguishes_missing_and_empty_lists() {
        let input: UpdateIllustration = serde_json::from_value(serde_json::json!({
            "parent_category_ids": [],
        }))
        .unwrap();

        assert!(input.image.title.is_none());
        assert_eq!(input.relation_ids(RelationKind::Character), None);
        assert_eq!(
            input.relation_ids(RelationKind::ParentCategory),
            Some(&[][..])
        );
    }

    #[test]
    fn blank_title_fails_validation() {
        let input: CreateIllustration = serde_json::from_value(serde_json::json!({
            "title": "",
            "original_src": "/static/images/a.png",
        }))
        .unwrap();

        assert!(input.validate().is_err());
    }
}
