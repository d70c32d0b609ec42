//! Store abstraction used by the reconciler, the aggregator, and handlers.
//!
//! A [`CatalogStore`] hands out [`CatalogSession`]s. A session opened with
//! [`CatalogStore::session`] runs every call on its own (autocommit); one
//! opened with [`CatalogStore::begin`] is a transaction that only becomes
//! visible after [`CatalogSession::commit`]. Dropping an uncommitted
//! transactional session rolls it back.
//!
//! Two implementations ship with the crate: [`PgCatalogStore`] over a sqlx
//! pool and [`MemoryCatalogStore`], an in-process store used by tests.

use async_trait::async_trait;
use illustra_core::relations::RelationKind;
use illustra_core::types::DbId;

use crate::error::StoreError;
use crate::models::category::{
    ChildCategory, CreateChildCategory, CreateParentCategory, ParentCategory,
    UpdateChildCategory, UpdateParentCategory,
};
use crate::models::character::{Character, CreateCharacter, UpdateCharacter};
use crate::models::image::{CreateImage, Image, UpdateImage};
use crate::models::operator::{CreateOperator, Operator};
use crate::models::relation::ImageRelation;
use crate::models::session::{CreateSession, OperatorSession};

pub mod memory;
pub mod pg;

pub use memory::{MemoryCatalogStore, MemoryOp, WriteCounts};
pub use pg::PgCatalogStore;

/// Shared handle to the catalog's persistent state.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Open an autocommit session.
    async fn session(&self) -> Result<Box<dyn CatalogSession>, StoreError>;

    /// Open a transactional session.
    async fn begin(&self) -> Result<Box<dyn CatalogSession>, StoreError>;

    /// Verify the backing store is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// One unit of work against the catalog.
///
/// `list_*` methods take `limit`/`offset` already clamped by the caller.
/// `update_*` methods apply only the `Some` fields and return `None` when the
/// row does not exist; `delete_*` methods return whether a row was removed.
#[async_trait]
pub trait CatalogSession: Send {
    // -- images --------------------------------------------------------------

    async fn create_image(&mut self, input: &CreateImage) -> Result<Image, StoreError>;
    async fn find_image(&mut self, id: DbId) -> Result<Option<Image>, StoreError>;
    async fn list_images(&mut self, limit: i64, offset: i64) -> Result<Vec<Image>, StoreError>;
    async fn search_images(
        &mut self,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Image>, StoreError>;
    /// Images linked to `related_id` through the `kind` join table.
    async fn list_images_by_related(
        &mut self,
        kind: RelationKind,
        related_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Image>, StoreError>;
    async fn update_image(
        &mut self,
        id: DbId,
        input: &UpdateImage,
    ) -> Result<Option<Image>, StoreError>;
    async fn delete_image(&mut self, id: DbId) -> Result<bool, StoreError>;

    // -- characters ----------------------------------------------------------

    async fn create_character(&mut self, input: &CreateCharacter)
        -> Result<Character, StoreError>;
    async fn find_character(&mut self, id: DbId) -> Result<Option<Character>, StoreError>;
    async fn list_characters(
        &mut self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Character>, StoreError>;
    async fn search_characters(
        &mut self,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Character>, StoreError>;
    async fn update_character(
        &mut self,
        id: DbId,
        input: &UpdateCharacter,
    ) -> Result<Option<Character>, StoreError>;
    async fn delete_character(&mut self, id: DbId) -> Result<bool, StoreError>;

    // -- parent categories ---------------------------------------------------

    async fn create_parent_category(
        &mut self,
        input: &CreateParentCategory,
    ) -> Result<ParentCategory, StoreError>;
    async fn find_parent_category(
        &mut self,
        id: DbId,
    ) -> Result<Option<ParentCategory>, StoreError>;
    async fn list_parent_categories(
        &mut self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ParentCategory>, StoreError>;
    async fn search_parent_categories(
        &mut self,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ParentCategory>, StoreError>;
    async fn update_parent_category(
        &mut self,
        id: DbId,
        input: &UpdateParentCategory,
    ) -> Result<Option<ParentCategory>, StoreError>;
    async fn delete_parent_category(&mut self, id: DbId) -> Result<bool, StoreError>;

    // -- child categories ----------------------------------------------------

    async fn create_child_category(
        &mut self,
        input: &CreateChildCategory,
    ) -> Result<ChildCategory, StoreError>;
    async fn find_child_category(
        &mut self,
        id: DbId,
    ) -> Result<Option<ChildCategory>, StoreError>;
    async fn list_child_categories(
        &mut self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChildCategory>, StoreError>;
    async fn list_child_categories_by_parent(
        &mut self,
        parent_id: DbId,
    ) -> Result<Vec<ChildCategory>, StoreError>;
    async fn search_child_categories(
        &mut self,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChildCategory>, StoreError>;
    async fn update_child_category(
        &mut self,
        id: DbId,
        input: &UpdateChildCategory,
    ) -> Result<Option<ChildCategory>, StoreError>;
    async fn delete_child_category(&mut self, id: DbId) -> Result<bool, StoreError>;

    // -- join rows -----------------------------------------------------------

    /// Join rows of one image, in insertion order.
    async fn list_relations(
        &mut self,
        kind: RelationKind,
        image_id: DbId,
    ) -> Result<Vec<ImageRelation>, StoreError>;
    async fn create_relation(
        &mut self,
        kind: RelationKind,
        image_id: DbId,
        related_id: DbId,
    ) -> Result<ImageRelation, StoreError>;
    /// Delete one join row by its own id.
    async fn delete_relation(&mut self, kind: RelationKind, id: DbId)
        -> Result<bool, StoreError>;
    async fn delete_relations_by_image(
        &mut self,
        kind: RelationKind,
        image_id: DbId,
    ) -> Result<u64, StoreError>;
    async fn delete_relations_by_related(
        &mut self,
        kind: RelationKind,
        related_id: DbId,
    ) -> Result<u64, StoreError>;

    // -- operators and sessions ----------------------------------------------

    async fn create_operator(&mut self, input: &CreateOperator) -> Result<Operator, StoreError>;
    async fn find_operator(&mut self, id: DbId) -> Result<Option<Operator>, StoreError>;
    async fn find_operator_by_name(&mut self, name: &str)
        -> Result<Option<Operator>, StoreError>;
    async fn create_session(
        &mut self,
        input: &CreateSession,
    ) -> Result<OperatorSession, StoreError>;
    /// Active (unrevoked, unexpired) session holding `hash`.
    async fn find_active_session(
        &mut self,
        hash: &str,
    ) -> Result<Option<OperatorSession>, StoreError>;
    /// Whether session `id` exists and is neither revoked nor expired.
    async fn is_session_active(&mut self, id: DbId) -> Result<bool, StoreError>;
    async fn revoke_session(&mut self, id: DbId) -> Result<bool, StoreError>;
    async fn revoke_operator_sessions(&mut self, operator_id: DbId) -> Result<u64, StoreError>;

    // -- stored files --------------------------------------------------------

    /// Whether any image, character, or parent category row names `filename`
    /// as its stored file.
    async fn is_file_referenced(&mut self, filename: &str) -> Result<bool, StoreError>;

    // -- unit of work --------------------------------------------------------

    /// Make the session's writes durable. A no-op for autocommit sessions.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
