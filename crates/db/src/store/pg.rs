//! Postgres-backed [`CatalogStore`] delegating to the repositories.

use async_trait::async_trait;
use illustra_core::relations::RelationKind;
use illustra_core::types::DbId;
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, Postgres, Transaction};

use super::{CatalogSession, CatalogStore};
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
use crate::repositories::{
    CharacterRepo, ChildCategoryRepo, ImageRelationRepo, ImageRepo, OperatorRepo,
    ParentCategoryRepo, SessionRepo, StoredFileRepo,
};
use crate::DbPool;

/// PostgreSQL error code for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// PostgreSQL error code for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// [`CatalogStore`] over a sqlx connection pool.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: DbPool,
}

impl PgCatalogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn session(&self) -> Result<Box<dyn CatalogSession>, StoreError> {
        let conn = self.pool.acquire().await.map_err(classify)?;
        Ok(Box::new(PgCatalogSession {
            handle: PgHandle::Pooled(conn),
        }))
    }

    async fn begin(&self) -> Result<Box<dyn CatalogSession>, StoreError> {
        let tx = self.pool.begin().await.map_err(classify)?;
        Ok(Box::new(PgCatalogSession {
            handle: PgHandle::Transaction(tx),
        }))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await.map_err(classify)
    }
}

enum PgHandle {
    Pooled(PoolConnection<Postgres>),
    Transaction(Transaction<'static, Postgres>),
}

/// A pooled connection or an open transaction.
///
/// Dropping a transactional session without committing rolls it back.
pub struct PgCatalogSession {
    handle: PgHandle,
}

impl PgCatalogSession {
    fn conn(&mut self) -> &mut PgConnection {
        match &mut self.handle {
            PgHandle::Pooled(conn) => &mut **conn,
            PgHandle::Transaction(tx) => &mut **tx,
        }
    }
}

/// Map a driver error onto [`StoreError`], surfacing constraint violations.
///
/// The constraint name is kept so callers can tell which key clashed.
pub fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or("unknown").to_string();
        match db_err.code().as_deref() {
            Some(FOREIGN_KEY_VIOLATION) => return StoreError::ForeignKey(constraint),
            Some(UNIQUE_VIOLATION) => return StoreError::Unique(constraint),
            _ => {}
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl CatalogSession for PgCatalogSession {
    async fn create_image(&mut self, input: &CreateImage) -> Result<Image, StoreError> {
        ImageRepo::create(self.conn(), input).await.map_err(classify)
    }

    async fn find_image(&mut self, id: DbId) -> Result<Option<Image>, StoreError> {
        ImageRepo::find_by_id(self.conn(), id).await.map_err(classify)
    }

    async fn list_images(&mut self, limit: i64, offset: i64) -> Result<Vec<Image>, StoreError> {
        ImageRepo::list(self.conn(), limit, offset)
            .await
            .map_err(classify)
    }

    async fn search_images(
        &mut self,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Image>, StoreError> {
        ImageRepo::search(self.conn(), term, limit, offset)
            .await
            .map_err(classify)
    }

    async fn list_images_by_related(
        &mut self,
        kind: RelationKind,
        related_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Image>, StoreError> {
        ImageRepo::list_by_related(self.conn(), kind, related_id, limit, offset)
            .await
            .map_err(classify)
    }

    async fn update_image(
        &mut self,
        id: DbId,
        input: &UpdateImage,
    ) -> Result<Option<Image>, StoreError> {
        ImageRepo::update(self.conn(), id, input)
            .await
            .map_err(classify)
    }

    async fn delete_image(&mut self, id: DbId) -> Result<bool, StoreError> {
        ImageRepo::delete(self.conn(), id).await.map_err(classify)
    }

    async fn create_character(
        &mut self,
        input: &CreateCharacter,
    ) -> Result<Character, StoreError> {
        CharacterRepo::create(self.conn(), input)
            .await
            .map_err(classify)
    }

    async fn find_character(&mut self, id: DbId) -> Result<Option<Character>, StoreError> {
        CharacterRepo::find_by_id(self.conn(), id)
            .await
            .map_err(classify)
    }

    async fn list_characters(
        &mut self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Character>, StoreError> {
        CharacterRepo::list(self.conn(), limit, offset)
            .await
            .map_err(classify)
    }

    async fn search_characters(
        &mut self,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Character>, StoreError> {
        CharacterRepo::search(self.conn(), term, limit, offset)
            .await
            .map_err(classify)
    }

    async fn update_character(
        &mut self,
        id: DbId,
        input: &UpdateCharacter,
    ) -> Result<Option<Character>, StoreError> {
        CharacterRepo::update(self.conn(), id, input)
            .await
            .map_err(classify)
    }

    async fn delete_character(&mut self, id: DbId) -> Result<bool, StoreError> {
        CharacterRepo::delete(self.conn(), id)
            .await
            .map_err(classify)
    }

    async fn create_parent_category(
        &mut self,
        input: &CreateParentCategory,
    ) -> Result<ParentCategory, StoreError> {
        ParentCategoryRepo::create(self.conn(), input)
            .await
            .map_err(classify)
    }

    async fn find_parent_category(
        &mut self,
        id: DbId,
    ) -> Result<Option<ParentCategory>, StoreError> {
        ParentCategoryRepo::find_by_id(self.conn(), id)
            .await
            .map_err(classify)
    }

    async fn list_parent_categories(
        &mut self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ParentCategory>, StoreError> {
        ParentCategoryRepo::list(self.conn(), limit, offset)
            .await
            .map_err(classify)
    }

    async fn search_parent_categories(
        &mut self,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ParentCategory>, StoreError> {
        ParentCategoryRepo::search(self.conn(), term, limit, offset)
            .await
            .map_err(classify)
    }

    async fn update_parent_category(
        &mut self,
        id: DbId,
        input: &UpdateParentCategory,
    ) -> Result<Option<ParentCategory>, StoreError> {
        ParentCategoryRepo::update(self.conn(), id, input)
            .await
            .map_err(classify)
    }

    async fn delete_parent_category(&mut self, id: DbId) -> Result<bool, StoreError> {
        ParentCategoryRepo::delete(self.conn(), id)
            .await
            .map_err(classify)
    }

    async fn create_child_category(
        &mut self,
        input: &CreateChildCategory,
    ) -> Result<ChildCategory, StoreError> {
        ChildCategoryRepo::create(self.conn(), input)
            .await
            .map_err(classify)
    }

    async fn find_child_category(
        &mut self,
        id: DbId,
    ) -> Result<Option<ChildCategory>, StoreError> {
        ChildCategoryRepo::find_by_id(self.conn(), id)
            .await
            .map_err(classify)
    }

    async fn list_child_categories(
        &mut self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChildCategory>, StoreError> {
        ChildCategoryRepo::list(self.conn(), limit, offset)
            .await
            .map_err(classify)
    }

    async fn list_child_categories_by_parent(
        &mut self,
        parent_id: DbId,
    ) -> Result<Vec<ChildCategory>, StoreError> {
        ChildCategoryRepo::list_by_parent(self.conn(), parent_id)
            .await
            .map_err(classify)
    }

    async fn search_child_categories(
        &mut self,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChildCategory>, StoreError> {
        ChildCategoryRepo::search(self.conn(), term, limit, offset)
            .await
            .map_err(classify)
    }

    async fn update_child_category(
        &mut self,
        id: DbId,
        input: &UpdateChildCategory,
    ) -> Result<Option<ChildCategory>, StoreError> {
        ChildCategoryRepo::update(self.conn(), id, input)
            .await
            .map_err(classify)
    }

    async fn delete_child_category(&mut self, id: DbId) -> Result<bool, StoreError> {
        ChildCategoryRepo::delete(self.conn(), id)
            .await
            .map_err(classify)
    }

    async fn list_relations(
        &mut self,
        kind: RelationKind,
        image_id: DbId,
    ) -> Result<Vec<ImageRelation>, StoreError> {
        ImageRelationRepo::list_by_image(self.conn(), kind, image_id)
            .await
            .map_err(classify)
    }

    async fn create_relation(
        &mut self,
        kind: RelationKind,
        image_id: DbId,
        related_id: DbId,
    ) -> Result<ImageRelation, StoreError> {
        ImageRelationRepo::create(self.conn(), kind, image_id, related_id)
            .await
            .map_err(classify)
    }

    async fn delete_relation(
        &mut self,
        kind: RelationKind,
        id: DbId,
    ) -> Result<bool, StoreError> {
        ImageRelationRepo::delete(self.conn(), kind, id)
            .await
            .map_err(classify)
    }

    async fn delete_relations_by_image(
        &mut self,
        kind: RelationKind,
        image_id: DbId,
    ) -> Result<u64, StoreError> {
        ImageRelationRepo::delete_by_image(self.conn(), kind, image_id)
            .await
            .map_err(classify)
    }

    async fn delete_relations_by_related(
        &mut self,
        kind: RelationKind,
        related_id: DbId,
    ) -> Result<u64, StoreError> {
        ImageRelationRepo::delete_by_related(self.conn(), kind, related_id)
            .await
            .map_err(classify)
    }

    async fn create_operator(&mut self, input: &CreateOperator) -> Result<Operator, StoreError> {
        OperatorRepo::create(self.conn(), input)
            .await
            .map_err(classify)
    }

    async fn find_operator(&mut self, id: DbId) -> Result<Option<Operator>, StoreError> {
        OperatorRepo::find_by_id(self.conn(), id)
            .await
            .map_err(classify)
    }

    async fn find_operator_by_name(
        &mut self,
        name: &str,
    ) -> Result<Option<Operator>, StoreError> {
        OperatorRepo::find_by_name(self.conn(), name)
            .await
            .map_err(classify)
    }

    async fn create_session(
        &mut self,
        input: &CreateSession,
    ) -> Result<OperatorSession, StoreError> {
        SessionRepo::create(self.conn(), input)
            .await
            .map_err(classify)
    }

    async fn find_active_session(
        &mut self,
        hash: &str,
    ) -> Result<Option<OperatorSession>, StoreError> {
        SessionRepo::find_by_refresh_token_hash(self.conn(), hash)
            .await
            .map_err(classify)
    }

    async fn is_session_active(&mut self, id: DbId) -> Result<bool, StoreError> {
        SessionRepo::is_active(self.conn(), id)
            .await
            .map_err(classify)
    }

    async fn revoke_session(&mut self, id: DbId) -> Result<bool, StoreError> {
        SessionRepo::revoke(self.conn(), id)
            .await
            .map_err(classify)
    }

    async fn revoke_operator_sessions(&mut self, operator_id: DbId) -> Result<u64, StoreError> {
        SessionRepo::revoke_all_for_operator(self.conn(), operator_id)
            .await
            .map_err(classify)
    }

    async fn is_file_referenced(&mut self, filename: &str) -> Result<bool, StoreError> {
        StoredFileRepo::is_referenced(self.conn(), filename)
            .await
            .map_err(classify)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let session = *self;
        match session.handle {
            PgHandle::Transaction(tx) => tx.commit().await.map_err(classify),
            PgHandle::Pooled(_) => Ok(()),
        }
    }
}
