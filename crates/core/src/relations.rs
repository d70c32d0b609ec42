//! Image relation kinds and reconciliation planning.
//!
//! An image links to characters, parent categories, and child categories
//! through three join tables. [`plan_relation_changes`] computes the minimal
//! set of join-row deletions and insertions that turns the persisted links
//! into a desired set; the storage layer applies the plan.

use std::collections::HashSet;
use std::fmt;

use crate::types::DbId;

/// Which join table a relation lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Character,
    ParentCategory,
    ChildCategory,
}

impl RelationKind {
    /// All kinds, in the order mutations reconcile them.
    pub const ALL: [RelationKind; 3] = [
        RelationKind::Character,
        RelationKind::ParentCategory,
        RelationKind::ChildCategory,
    ];

    /// Join table holding relations of this kind.
    pub fn table(self) -> &'static str {
        match self {
            RelationKind::Character => "image_characters",
            RelationKind::ParentCategory => "image_parent_categories",
            RelationKind::ChildCategory => "image_child_categories",
        }
    }

    /// Column in [`Self::table`] referencing the related entity.
    pub fn related_column(self) -> &'static str {
        match self {
            RelationKind::Character => "character_id",
            RelationKind::ParentCategory => "parent_category_id",
            RelationKind::ChildCategory => "child_category_id",
        }
    }

    /// Entity name of the related row, as used in not-found errors.
    pub fn entity(self) -> &'static str {
        match self {
            RelationKind::Character => "Character",
            RelationKind::ParentCategory => "ParentCategory",
            RelationKind::ChildCategory => "ChildCategory",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RelationKind::Character => "character",
            RelationKind::ParentCategory => "parent-category",
            RelationKind::ChildCategory => "child-category",
        };
        f.write_str(label)
    }
}

/// Store operation performed while reconciling, used to tag failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationOp {
    List,
    Create,
    Delete,
}

impl fmt::Display for RelationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RelationOp::List => "list",
            RelationOp::Create => "create",
            RelationOp::Delete => "delete",
        };
        f.write_str(label)
    }
}

/// Writes required to converge one image's relations of one kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationPlan {
    /// Join-row ids to delete.
    pub delete: Vec<DbId>,
    /// Related-entity ids to link.
    pub create: Vec<DbId>,
}

impl RelationPlan {
    /// `true` when the persisted relations already match.
    pub fn is_noop(&self) -> bool {
        self.delete.is_empty() && self.create.is_empty()
    }
}

/// Compute the minimal plan that makes `existing` equal to `desired`.
///
/// `existing` yields `(relation_id, related_id)` pairs for the current join
/// rows. Duplicate ids in `desired` collapse and `create` keeps the order of
/// first occurrence. When the table holds more than one row for the same
/// related id, the first row is kept and the surplus rows are deleted.
///
/// # Examples
///
/// ```
/// use illustra_core::relations::plan_relation_changes;
///
/// // Rows 100 and 101 link related ids 5 and 7.
/// let plan = plan_relation_changes([(100, 5), (101, 7)], &[7, 9]);
/// assert_eq!(plan.delete, vec![100]);
/// assert_eq!(plan.create, vec![9]);
/// ```
pub fn plan_relation_changes<I>(existing: I, desired: &[DbId]) -> RelationPlan
where
    I: IntoIterator<Item = (DbId, DbId)>,
{
    let wanted: HashSet<DbId> = desired.iter().copied().collect();
    let mut linked: HashSet<DbId> = HashSet::new();
    let mut plan = RelationPlan::default();

    for (relation_id, related_id) in existing {
        if !wanted.contains(&related_id) || !linked.insert(related_id) {
            plan.delete.push(relation_id);
        }
    }

    let mut queued: HashSet<DbId> = HashSet::new();
    for &related_id in desired {
        if !linked.contains(&related_id) && queued.insert(related_id) {
            plan.create.push(related_id);
        }
    }

    plan
}
