//! In-process [`CatalogStore`] used by tests and local tooling.
//!
//! Tables live behind one mutex. A transactional session works on a private
//! copy of every table and swaps it in on commit, so uncommitted writes are
//! invisible to other sessions and vanish on drop. Concurrent transactions
//! are not merged: the last commit wins.
//!
//! The store enforces the same foreign keys and unique constraints as the
//! Postgres schema, reporting them under the same constraint names. It also
//! counts relation writes per [`RelationKind`] and can be told to fail
//! selected operations through [`MemoryCatalogStore::fail_on`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use illustra_core::relations::RelationKind;
use illustra_core::search::matches_query;
use illustra_core::types::DbId;

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

/// Store operations that [`MemoryCatalogStore::fail_on`] can break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryOp {
    FindImage,
    CreateImage,
    UpdateImage,
    DeleteImage,
    FindCharacter,
    FindParentCategory,
    FindChildCategory,
    ListRelations(RelationKind),
    CreateRelation(RelationKind),
    DeleteRelation(RelationKind),
    Commit,
}

/// Join-row writes issued for one relation kind.
///
/// Writes are counted when issued, including those later rolled back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCounts {
    pub created: usize,
    pub deleted: usize,
}

type Writes = HashMap<RelationKind, WriteCounts>;

#[derive(Debug, Clone, Default)]
struct Tables {
    last_id: DbId,
    images: BTreeMap<DbId, Image>,
    characters: BTreeMap<DbId, Character>,
    parent_categories: BTreeMap<DbId, ParentCategory>,
    child_categories: BTreeMap<DbId, ChildCategory>,
    relations: HashMap<RelationKind, BTreeMap<DbId, ImageRelation>>,
    operators: BTreeMap<DbId, Operator>,
    sessions: BTreeMap<DbId, OperatorSession>,
}

#[derive(Debug, Default)]
struct Shared {
    tables: Tables,
    writes: Writes,
    faults: HashSet<MemoryOp>,
}

/// Shared in-memory catalog. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogStore {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every later call of `op` fail with [`StoreError::Unavailable`].
    pub fn fail_on(&self, op: MemoryOp) {
        self.lock().faults.insert(op);
    }

    /// Remove all injected failures.
    pub fn clear_faults(&self) {
        self.lock().faults.clear();
    }

    /// Relation writes issued for `kind` since creation or the last reset.
    pub fn write_counts(&self, kind: RelationKind) -> WriteCounts {
        self.lock().writes.get(&kind).copied().unwrap_or_default()
    }

    /// Zero every write counter.
    pub fn reset_write_counts(&self) {
        self.lock().writes.clear();
    }

    /// Committed related ids of one image, in join-row order.
    pub fn related_ids(&self, kind: RelationKind, image_id: DbId) -> Vec<DbId> {
        self.lock()
            .tables
            .relations_of(kind, image_id)
            .map(|r| r.related_id)
            .collect()
    }

    /// Insert a join row directly, skipping foreign-key and unique checks.
    ///
    /// Models rows written before the constraints existed, such as duplicate
    /// links or links to entities that were deleted out of band.
    pub fn insert_relation_unchecked(
        &self,
        kind: RelationKind,
        image_id: DbId,
        related_id: DbId,
    ) -> ImageRelation {
        self.lock().tables.insert_relation(kind, image_id, related_id)
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn session(&self) -> Result<Box<dyn CatalogSession>, StoreError> {
        Ok(Box::new(MemoryCatalogSession {
            store: self.clone(),
            pending: None,
        }))
    }

    async fn begin(&self) -> Result<Box<dyn CatalogSession>, StoreError> {
        let snapshot = self.lock().tables.clone();
        Ok(Box::new(MemoryCatalogSession {
            store: self.clone(),
            pending: Some(snapshot),
        }))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Table helpers
// ---------------------------------------------------------------------------

fn page<'a, T: Clone + 'a>(rows: impl Iterator<Item = &'a T>, limit: i64, offset: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    rows.skip(offset).take(limit).cloned().collect()
}

fn fk_constraint(table: &str, column: &str) -> StoreError {
    StoreError::ForeignKey(format!("{table}_{column}_fkey"))
}

fn unique_constraint(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Character => "uq_image_characters_image_character",
        RelationKind::ParentCategory => "uq_image_parent_categories_image_parent",
        RelationKind::ChildCategory => "uq_image_child_categories_image_child",
    }
}

fn by_name<T>(rows: &BTreeMap<DbId, T>, name: impl Fn(&T) -> &str) -> Vec<&T> {
    let mut sorted: Vec<&T> = rows.values().collect();
    sorted.sort_by(|a, b| name(a).cmp(name(b)));
    sorted
}

impl Tables {
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }

    fn relations_of(
        &self,
        kind: RelationKind,
        image_id: DbId,
    ) -> impl Iterator<Item = &ImageRelation> + '_ {
        self.relations
            .get(&kind)
            .into_iter()
            .flat_map(|rows| rows.values())
            .filter(move |r| r.image_id == image_id)
    }

    fn is_referenced(&self, kind: RelationKind, related_id: DbId) -> bool {
        self.relations
            .get(&kind)
            .is_some_and(|rows| rows.values().any(|r| r.related_id == related_id))
    }

    fn related_exists(&self, kind: RelationKind, related_id: DbId) -> bool {
        match kind {
            RelationKind::Character => self.characters.contains_key(&related_id),
            RelationKind::ParentCategory => self.parent_categories.contains_key(&related_id),
            RelationKind::ChildCategory => self.child_categories.contains_key(&related_id),
        }
    }

    fn insert_relation(
        &mut self,
        kind: RelationKind,
        image_id: DbId,
        related_id: DbId,
    ) -> ImageRelation {
        let now = Utc::now();
        let relation = ImageRelation {
            id: self.next_id(),
            image_id,
            related_id,
            created_at: now,
            updated_at: now,
        };
        self.relations
            .entry(kind)
            .or_default()
            .insert(relation.id, relation.clone());
        relation
    }

    fn delete_relations_where(
        &mut self,
        kind: RelationKind,
        keep: impl Fn(&ImageRelation) -> bool,
    ) -> u64 {
        let Some(rows) = self.relations.get_mut(&kind) else {
            return 0;
        };
        let before = rows.len();
        rows.retain(|_, r| keep(r));
        (before - rows.len()) as u64
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Session over a [`MemoryCatalogStore`].
pub struct MemoryCatalogSession {
    store: MemoryCatalogStore,
    /// Private copy of the tables while a transaction is open.
    pending: Option<Tables>,
}

impl MemoryCatalogSession {
    /// Run `f` against the session's view of the tables.
    fn with_tables<T>(
        &mut self,
        op: Option<MemoryOp>,
        f: impl FnOnce(&mut Tables, &mut Writes) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.store.lock();
        let shared = &mut *guard;
        if let Some(op) = op {
            if shared.faults.contains(&op) {
                return Err(StoreError::Unavailable(format!("injected failure: {op:?}")));
            }
        }
        let tables = match self.pending.as_mut() {
            Some(tables) => tables,
            None => &mut shared.tables,
        };
        f(tables, &mut shared.writes)
    }

    fn read<T>(
        &mut self,
        op: Option<MemoryOp>,
        f: impl FnOnce(&Tables) -> T,
    ) -> Result<T, StoreError> {
        self.with_tables(op, |tables, _| Ok(f(tables)))
    }
}

#[async_trait]
impl CatalogSession for MemoryCatalogSession {
    async fn create_image(&mut self, input: &CreateImage) -> Result<Image, StoreError> {
        self.with_tables(Some(MemoryOp::CreateImage), |t, _| {
            let now = Utc::now();
            let image = Image {
                id: t.next_id(),
                title: input.title.clone(),
                original_src: input.original_src.clone(),
                simple_src: input.simple_src.clone(),
                original_filename: input.original_filename.clone(),
                simple_filename: input.simple_filename.clone(),
                created_at: now,
                updated_at: now,
            };
            t.images.insert(image.id, image.clone());
            Ok(image)
        })
    }

    async fn find_image(&mut self, id: DbId) -> Result<Option<Image>, StoreError> {
        self.read(Some(MemoryOp::FindImage), |t| t.images.get(&id).cloned())
    }

    async fn list_images(&mut self, limit: i64, offset: i64) -> Result<Vec<Image>, StoreError> {
        self.read(None, |t| page(t.images.values().rev(), limit, offset))
    }

    async fn search_images(
        &mut self,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Image>, StoreError> {
        self.read(None, |t| {
            let hits = t
                .images
                .values()
                .rev()
                .filter(|i| matches_query(&i.title, term));
            page(hits, limit, offset)
        })
    }

    async fn list_images_by_related(
        &mut self,
        kind: RelationKind,
        related_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Image>, StoreError> {
        self.read(None, |t| {
            let linked: HashSet<DbId> = t
                .relations
                .get(&kind)
                .into_iter()
                .flat_map(|rows| rows.values())
                .filter(|r| r.related_id == related_id)
                .map(|r| r.image_id)
                .collect();
            let hits = t
                .images
                .values()
                .rev()
                .filter(|i| linked.contains(&i.id));
            page(hits, limit, offset)
        })
    }

    async fn update_image(
        &mut self,
        id: DbId,
        input: &UpdateImage,
    ) -> Result<Option<Image>, StoreError> {
        self.with_tables(Some(MemoryOp::UpdateImage), |t, _| {
            let Some(image) = t.images.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(title) = &input.title {
                image.title = title.clone();
            }
            if let Some(src) = &input.original_src {
                image.original_src = src.clone();
            }
            if let Some(simple_src) = &input.simple_src {
                image.simple_src = simple_src.clone();
            }
            if input.original_filename.is_some() {
                image.original_filename = input.original_filename.clone();
            }
            if let Some(simple_filename) = &input.simple_filename {
                image.simple_filename = simple_filename.clone();
            }
            image.updated_at = Utc::now();
            Ok(Some(image.clone()))
        })
    }

    async fn delete_image(&mut self, id: DbId) -> Result<bool, StoreError> {
        self.with_tables(Some(MemoryOp::DeleteImage), |t, _| {
            for kind in RelationKind::ALL {
                if t.relations_of(kind, id).next().is_some() {
                    return Err(fk_constraint(kind.table(), "image_id"));
                }
            }
            Ok(t.images.remove(&id).is_some())
        })
    }

    async fn create_character(
        &mut self,
        input: &CreateCharacter,
    ) -> Result<Character, StoreError> {
        self.with_tables(None, |t, _| {
            let now = Utc::now();
            let character = Character {
                id: t.next_id(),
                name: input.name.clone(),
                src: input.src.clone(),
                filename: input.filename.clone(),
                created_at: now,
                updated_at: now,
            };
            t.characters.insert(character.id, character.clone());
            Ok(character)
        })
    }

    async fn find_character(&mut self, id: DbId) -> Result<Option<Character>, StoreError> {
        self.read(Some(MemoryOp::FindCharacter), |t| {
            t.characters.get(&id).cloned()
        })
    }

    async fn list_characters(
        &mut self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Character>, StoreError> {
        self.read(None, |t| {
            page(by_name(&t.characters, |c| &c.name).into_iter(), limit, offset)
        })
    }

    async fn search_characters(
        &mut self,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Character>, StoreError> {
        self.read(None, |t| {
            let hits = by_name(&t.characters, |c| &c.name)
                .into_iter()
                .filter(|c| matches_query(&c.name, term));
            page(hits, limit, offset)
        })
    }

    async fn update_character(
        &mut self,
        id: DbId,
        input: &UpdateCharacter,
    ) -> Result<Option<Character>, StoreError> {
        self.with_tables(None, |t, _| {
            let Some(character) = t.characters.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(name) = &input.name {
                character.name = name.clone();
            }
            if let Some(src) = &input.src {
                character.src = src.clone();
            }
            if input.filename.is_some() {
                character.filename = input.filename.clone();
            }
            character.updated_at = Utc::now();
            Ok(Some(character.clone()))
        })
    }

    async fn delete_character(&mut self, id: DbId) -> Result<bool, StoreError> {
        self.with_tables(None, |t, _| {
            if t.is_referenced(RelationKind::Character, id) {
                return Err(fk_constraint("image_characters", "character_id"));
            }
            Ok(t.characters.remove(&id).is_some())
        })
    }

    async fn create_parent_category(
        &mut self,
        input: &CreateParentCategory,
    ) -> Result<ParentCategory, StoreError> {
        self.with_tables(None, |t, _| {
            let now = Utc::now();
            let parent = ParentCategory {
                id: t.next_id(),
                name: input.name.clone(),
                src: input.src.clone(),
                filename: input.filename.clone(),
                created_at: now,
                updated_at: now,
            };
            t.parent_categories.insert(parent.id, parent.clone());
            Ok(parent)
        })
    }

    async fn find_parent_category(
        &mut self,
        id: DbId,
    ) -> Result<Option<ParentCategory>, StoreError> {
        self.read(Some(MemoryOp::FindParentCategory), |t| {
            t.parent_categories.get(&id).cloned()
        })
    }

    async fn list_parent_categories(
        &mut self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ParentCategory>, StoreError> {
        self.read(None, |t| {
            page(
                by_name(&t.parent_categories, |p| &p.name).into_iter(),
                limit,
                offset,
            )
        })
    }

    async fn search_parent_categories(
        &mut self,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ParentCategory>, StoreError> {
        self.read(None, |t| {
            let hits = by_name(&t.parent_categories, |p| &p.name)
                .into_iter()
                .filter(|p| matches_query(&p.name, term));
            page(hits, limit, offset)
        })
    }

    async fn update_parent_category(
        &mut self,
        id: DbId,
        input: &UpdateParentCategory,
    ) -> Result<Option<ParentCategory>, StoreError> {
        self.with_tables(None, |t, _| {
            let Some(parent) = t.parent_categories.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(name) = &input.name {
                parent.name = name.clone();
            }
            if let Some(src) = &input.src {
                parent.src = src.clone();
            }
            if input.filename.is_some() {
                parent.filename = input.filename.clone();
            }
            parent.updated_at = Utc::now();
            Ok(Some(parent.clone()))
        })
    }

    async fn delete_parent_category(&mut self, id: DbId) -> Result<bool, StoreError> {
        self.with_tables(None, |t, _| {
            if t.child_categories.values().any(|c| c.parent_id == id) {
                return Err(fk_constraint("child_categories", "parent_id"));
            }
            if t.is_referenced(RelationKind::ParentCategory, id) {
                return Err(fk_constraint("image_parent_categories", "parent_category_id"));
            }
            Ok(t.parent_categories.remove(&id).is_some())
        })
    }

    async fn create_child_category(
        &mut self,
        input: &CreateChildCategory,
    ) -> Result<ChildCategory, StoreError> {
        self.with_tables(None, |t, _| {
            if !t.parent_categories.contains_key(&input.parent_id) {
                return Err(fk_constraint("child_categories", "parent_id"));
            }
            let now = Utc::now();
            let child = ChildCategory {
                id: t.next_id(),
                name: input.name.clone(),
                parent_id: input.parent_id,
                created_at: now,
                updated_at: now,
            };
            t.child_categories.insert(child.id, child.clone());
            Ok(child)
        })
    }

    async fn find_child_category(
        &mut self,
        id: DbId,
    ) -> Result<Option<ChildCategory>, StoreError> {
        self.read(Some(MemoryOp::FindChildCategory), |t| {
            t.child_categories.get(&id).cloned()
        })
    }

    async fn list_child_categories(
        &mut self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChildCategory>, StoreError> {
        self.read(None, |t| {
            page(
                by_name(&t.child_categories, |c| &c.name).into_iter(),
                limit,
                offset,
            )
        })
    }

    async fn list_child_categories_by_parent(
        &mut self,
        parent_id: DbId,
    ) -> Result<Vec<ChildCategory>, StoreError> {
        self.read(None, |t| {
            by_name(&t.child_categories, |c| &c.name)
                .into_iter()
                .filter(|c| c.parent_id == parent_id)
                .cloned()
                .collect()
        })
    }

    async fn search_child_categories(
        &mut self,
        term: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChildCategory>, StoreError> {
        self.read(None, |t| {
            let hits = by_name(&t.child_categories, |c| &c.name)
                .into_iter()
                .filter(|c| matches_query(&c.name, term));
            page(hits, limit, offset)
        })
    }

    async fn update_child_category(
        &mut self,
        id: DbId,
        input: &UpdateChildCategory,
    ) -> Result<Option<ChildCategory>, StoreError> {
        self.with_tables(None, |t, _| {
            if let Some(parent_id) = input.parent_id {
                if !t.parent_categories.contains_key(&parent_id) {
                    return Err(fk_constraint("child_categories", "parent_id"));
                }
            }
            let Some(child) = t.child_categories.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(name) = &input.name {
                child.name = name.clone();
            }
            if let Some(parent_id) = input.parent_id {
                child.parent_id = parent_id;
            }
            child.updated_at = Utc::now();
            Ok(Some(child.clone()))
        })
    }

    async fn delete_child_category(&mut self, id: DbId) -> Result<bool, StoreError> {
        self.with_tables(None, |t, _| {
            if t.is_referenced(RelationKind::ChildCategory, id) {
                return Err(fk_constraint("image_child_categories", "child_category_id"));
            }
            Ok(t.child_categories.remove(&id).is_some())
        })
    }

    async fn list_relations(
        &mut self,
        kind: RelationKind,
        image_id: DbId,
    ) -> Result<Vec<ImageRelation>, StoreError> {
        self.read(Some(MemoryOp::ListRelations(kind)), |t| {
            t.relations_of(kind, image_id).cloned().collect()
        })
    }

    async fn create_relation(
        &mut self,
        kind: RelationKind,
        image_id: DbId,
        related_id: DbId,
    ) -> Result<ImageRelation, StoreError> {
        self.with_tables(Some(MemoryOp::CreateRelation(kind)), |t, writes| {
            writes.entry(kind).or_default().created += 1;
            if !t.images.contains_key(&image_id) {
                return Err(fk_constraint(kind.table(), "image_id"));
            }
            if !t.related_exists(kind, related_id) {
                return Err(fk_constraint(kind.table(), kind.related_column()));
            }
            if t.relations_of(kind, image_id).any(|r| r.related_id == related_id) {
                return Err(StoreError::Unique(unique_constraint(kind).to_string()));
            }
            Ok(t.insert_relation(kind, image_id, related_id))
        })
    }

    async fn delete_relation(
        &mut self,
        kind: RelationKind,
        id: DbId,
    ) -> Result<bool, StoreError> {
        self.with_tables(Some(MemoryOp::DeleteRelation(kind)), |t, writes| {
            writes.entry(kind).or_default().deleted += 1;
            Ok(t
                .relations
                .get_mut(&kind)
                .is_some_and(|rows| rows.remove(&id).is_some()))
        })
    }

    async fn delete_relations_by_image(
        &mut self,
        kind: RelationKind,
        image_id: DbId,
    ) -> Result<u64, StoreError> {
        self.with_tables(Some(MemoryOp::DeleteRelation(kind)), |t, _| {
            Ok(t.delete_relations_where(kind, |r| r.image_id != image_id))
        })
    }

    async fn delete_relations_by_related(
        &mut self,
        kind: RelationKind,
        related_id: DbId,
    ) -> Result<u64, StoreError> {
        self.with_tables(Some(MemoryOp::DeleteRelation(kind)), |t, _| {
            Ok(t.delete_relations_where(kind, |r| r.related_id != related_id))
        })
    }

    async fn create_operator(&mut self, input: &CreateOperator) -> Result<Operator, StoreError> {
        self.with_tables(None, |t, _| {
            if t.operators.values().any(|o| o.name == input.name) {
                return Err(StoreError::Unique("uq_operators_name".to_string()));
            }
            let now = Utc::now();
            let operator = Operator {
                id: t.next_id(),
                name: input.name.clone(),
                password_hash: input.password_hash.clone(),
                created_at: now,
                updated_at: now,
            };
            t.operators.insert(operator.id, operator.clone());
            Ok(operator)
        })
    }

    async fn find_operator(&mut self, id: DbId) -> Result<Option<Operator>, StoreError> {
        self.read(None, |t| t.operators.get(&id).cloned())
    }

    async fn find_operator_by_name(
        &mut self,
        name: &str,
    ) -> Result<Option<Operator>, StoreError> {
        self.read(None, |t| {
            t.operators.values().find(|o| o.name == name).cloned()
        })
    }

    async fn create_session(
        &mut self,
        input: &CreateSession,
    ) -> Result<OperatorSession, StoreError> {
        self.with_tables(None, |t, _| {
            if !t.operators.contains_key(&input.operator_id) {
                return Err(fk_constraint("operator_sessions", "operator_id"));
            }
            let now = Utc::now();
            let session = OperatorSession {
                id: t.next_id(),
                operator_id: input.operator_id,
                refresh_token_hash: input.refresh_token_hash.clone(),
                user_agent: input.user_agent.clone(),
                expires_at: input.expires_at,
                is_revoked: false,
                created_at: now,
                updated_at: now,
            };
            t.sessions.insert(session.id, session.clone());
            Ok(session)
        })
    }

    async fn find_active_session(
        &mut self,
        hash: &str,
    ) -> Result<Option<OperatorSession>, StoreError> {
        let now = Utc::now();
        self.read(None, |t| {
            t.sessions
                .values()
                .find(|s| s.refresh_token_hash == hash && !s.is_revoked && s.expires_at > now)
                .cloned()
        })
    }

    async fn is_session_active(&mut self, id: DbId) -> Result<bool, StoreError> {
        let now = Utc::now();
        self.read(None, |t| {
            t.sessions
                .get(&id)
                .is_some_and(|s| !s.is_revoked && s.expires_at > now)
        })
    }

    async fn revoke_session(&mut self, id: DbId) -> Result<bool, StoreError> {
        self.with_tables(None, |t, _| {
            Ok(match t.sessions.get_mut(&id) {
                Some(session) if !session.is_revoked => {
                    session.is_revoked = true;
                    session.updated_at = Utc::now();
                    true
                }
                _ => false,
            })
        })
    }

    async fn revoke_operator_sessions(&mut self, operator_id: DbId) -> Result<u64, StoreError> {
        self.with_tables(None, |t, _| {
            let mut revoked = 0;
            for session in t.sessions.values_mut() {
                if session.operator_id == operator_id && !session.is_revoked {
                    session.is_revoked = true;
                    session.updated_at = Utc::now();
                    revoked += 1;
                }
            }
            Ok(revoked)
        })
    }

    async fn is_file_referenced(&mut self, filename: &str) -> Result<bool, StoreError> {
        let named = |f: &Option<String>| f.as_deref() == Some(filename);
        self.read(None, |t| {
            t.images
                .values()
                .any(|i| named(&i.original_filename) || named(&i.simple_filename))
                || t.characters.values().any(|c| named(&c.filename))
                || t.parent_categories.values().any(|p| named(&p.filename))
        })
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let session = *self;
        let mut shared = session.store.lock();
        if shared.faults.contains(&MemoryOp::Commit) {
            return Err(StoreError::Unavailable("injected failure: Commit".to_string()));
        }
        if let Some(tables) = session.pending {
            shared.tables = tables;
        }
        Ok(())
    }
}
