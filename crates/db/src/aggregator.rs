//! Illustration Aggregator: assembles the read model for images.
//!
//! Child-category links are listed once per image and grouped by their
//! parent, so each [`Category`] only carries children that both belong to
//! its parent and are linked to the same image. A join row whose related
//! entity no longer exists is skipped with a warning; any store failure
//! aborts the pass.

use std::collections::HashMap;

use illustra_core::relations::{RelationKind, RelationOp};
use illustra_core::types::DbId;

use crate::error::{CatalogError, StoreError};
use crate::models::category::ChildCategory;
use crate::models::character::Character;
use crate::models::illustration::{Category, Illustration};
use crate::models::image::Image;
use crate::models::relation::ImageRelation;
use crate::store::CatalogSession;

/// Read-only assembler of [`Illustration`]s over a borrowed session.
pub struct IllustrationAggregator<'s, S: CatalogSession + ?Sized> {
    session: &'s mut S,
}

impl<'s, S: CatalogSession + ?Sized> IllustrationAggregator<'s, S> {
    pub fn new(session: &'s mut S) -> Self {
        Self { session }
    }

    /// Load an image by id and aggregate it. `None` if the image is missing.
    pub async fn load(&mut self, image_id: DbId) -> Result<Option<Illustration>, CatalogError> {
        let image = self
            .session
            .find_image(image_id)
            .await
            .map_err(|source| CatalogError::Fetch {
                entity: "Image",
                id: image_id,
                source,
            })?;
        match image {
            Some(image) => Ok(Some(self.aggregate(image).await?)),
            None => Ok(None),
        }
    }

    /// Resolve the characters and categories linked to `image`.
    pub async fn aggregate(&mut self, image: Image) -> Result<Illustration, CatalogError> {
        let characters = self.characters(image.id).await?;
        let categories = self.categories(image.id).await?;
        Ok(Illustration {
            image,
            characters,
            categories,
        })
    }

    /// Aggregate every image in order, stopping at the first failure.
    pub async fn aggregate_all(
        &mut self,
        images: Vec<Image>,
    ) -> Result<Vec<Illustration>, CatalogError> {
        let mut illustrations = Vec::with_capacity(images.len());
        for image in images {
            illustrations.push(self.aggregate(image).await?);
        }
        Ok(illustrations)
    }

    async fn relations(
        &mut self,
        kind: RelationKind,
        image_id: DbId,
    ) -> Result<Vec<ImageRelation>, CatalogError> {
        self.session
            .list_relations(kind, image_id)
            .await
            .map_err(|source| CatalogError::Relation {
                op: RelationOp::List,
                kind,
                image_id,
                source,
            })
    }

    async fn characters(&mut self, image_id: DbId) -> Result<Vec<Character>, CatalogError> {
        let kind = RelationKind::Character;
        let relations = self.relations(kind, image_id).await?;
        let mut characters = Vec::with_capacity(relations.len());
        for relation in &relations {
            let found = self.session.find_character(relation.related_id).await;
            if let Some(character) = resolved(kind, relation, found)? {
                characters.push(character);
            }
        }
        Ok(characters)
    }

    async fn categories(&mut self, image_id: DbId) -> Result<Vec<Category>, CatalogError> {
        let children_by_parent = self.linked_children(image_id).await?;

        let kind = RelationKind::ParentCategory;
        let relations = self.relations(kind, image_id).await?;
        let mut categories = Vec::with_capacity(relations.len());
        for relation in &relations {
            let found = self.session.find_parent_category(relation.related_id).await;
            if let Some(parent_category) = resolved(kind, relation, found)? {
                let child_category = children_by_parent
                    .get(&parent_category.id)
                    .cloned()
                    .unwrap_or_default();
                categories.push(Category {
                    parent_category,
                    child_category,
                });
            }
        }
        Ok(categories)
    }

    /// Child categories linked to the image, keyed by their parent id.
    async fn linked_children(
        &mut self,
        image_id: DbId,
    ) -> Result<HashMap<DbId, Vec<ChildCategory>>, CatalogError> {
        let kind = RelationKind::ChildCategory;
        let relations = self.relations(kind, image_id).await?;
        let mut by_parent: HashMap<DbId, Vec<ChildCategory>> = HashMap::new();
        for relation in &relations {
            let found = self.session.find_child_category(relation.related_id).await;
            if let Some(child) = resolved(kind, relation, found)? {
                by_parent.entry(child.parent_id).or_default().push(child);
            }
        }
        Ok(by_parent)
    }
}

/// Tag a fetch failure, or warn about and drop a dangling join row.
fn resolved<T>(
    kind: RelationKind,
    relation: &ImageRelation,
    found: Result<Option<T>, StoreError>,
) -> Result<Option<T>, CatalogError> {
    let row = found.map_err(|source| CatalogError::Fetch {
        entity: kind.entity(),
        id: relation.related_id,
        source,
    })?;
    if row.is_none() {
        tracing::warn!(
            image_id = relation.image_id,
            relation_id = relation.id,
            related_id = relation.related_id,
            kind = %kind,
            "Skipping relation to missing entity",
        );
    }
    Ok(row)
}
