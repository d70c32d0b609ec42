//! Relation Reconciler: syncs an image's join rows to a desired id set.
//!
//! The reconciler lists the persisted rows for one [`RelationKind`], plans
//! the minimal changes with [`plan_relation_changes`], then deletes surplus
//! rows before inserting missing links. It never rolls back on its own: run
//! it on a transactional session so a failure discards every earlier write.

use illustra_core::relations::{plan_relation_changes, RelationKind, RelationOp};
use illustra_core::types::DbId;

use crate::error::{CatalogError, StoreError};
use crate::store::CatalogSession;

/// Number of join rows written by one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub created: usize,
    pub deleted: usize,
}

impl ReconcileOutcome {
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.deleted == 0
    }
}

/// Applies relation plans through a borrowed [`CatalogSession`].
pub struct RelationReconciler<'s, S: CatalogSession + ?Sized> {
    session: &'s mut S,
}

impl<'s, S: CatalogSession + ?Sized> RelationReconciler<'s, S> {
    pub fn new(session: &'s mut S) -> Self {
        Self { session }
    }

    /// Make the `kind` links of `image_id` equal to `desired`.
    ///
    /// Duplicates in `desired` are ignored. Links already present are left
    /// untouched. The first failing store call aborts the pass and is
    /// returned tagged with the operation and relation kind.
    pub async fn reconcile(
        &mut self,
        image_id: DbId,
        kind: RelationKind,
        desired: &[DbId],
    ) -> Result<ReconcileOutcome, CatalogError> {
        let tag = |op: RelationOp| {
            move |source: StoreError| CatalogError::Relation {
                op,
                kind,
                image_id,
                source,
            }
        };

        let existing = self
            .session
            .list_relations(kind, image_id)
            .await
            .map_err(tag(RelationOp::List))?;

        let plan = plan_relation_changes(existing.iter().map(|r| (r.id, r.related_id)), desired);

        for &relation_id in &plan.delete {
            self.session
                .delete_relation(kind, relation_id)
                .await
                .map_err(tag(RelationOp::Delete))?;
        }

        for &related_id in &plan.create {
            self.session
                .create_relation(kind, image_id, related_id)
                .await
                .map_err(tag(RelationOp::Create))?;
        }

        let outcome = ReconcileOutcome {
            created: plan.create.len(),
            deleted: plan.delete.len(),
        };
        if !outcome.is_noop() {
            tracing::debug!(
                image_id,
                kind = %kind,
                created = outcome.created,
                deleted = outcome.deleted,
                "Reconciled image relations",
            );
        }
        Ok(outcome)
    }
}
