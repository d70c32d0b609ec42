//! HTTP handlers, one module per resource.
//!
//! Admin handlers require [`Admin`](crate::middleware::admin::Admin)
//! and run every multi-row mutation on a transactional session. Public
//! handlers in [`catalog`] are read-only and cached.

pub mod auth;
pub mod catalog;
pub mod characters;
pub mod child_categories;
pub mod illustrations;
pub mod operators;
pub mod parent_categories;
pub mod uploads;

use illustra_core::error::CoreError;
use illustra_core::search::normalize_query;
use illustra_core::types::DbId;
use illustra_db::store::CatalogSession;

use crate::error::{AppError, AppResult};

/// 404 for a missing entity.
pub(crate) fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

/// Normalized search term, or a validation error for blank input.
pub(crate) fn search_term(q: &str) -> AppResult<String> {
    normalize_query(q).ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "Search query must not be blank".into(),
        ))
    })
}

/// Stored filename that `new` no longer references.
pub(crate) fn replaced_file(old: Option<&str>, new: Option<&str>) -> Option<String> {
    match old {
        Some(old) if new != Some(old) => Some(old.to_string()),
        _ => None,
    }
}

/// The `candidates` that no image, character, or parent category names any
/// more, without duplicates.
///
/// Call it on the mutation's own session before committing, so the rows it
/// has just rewritten or removed are already accounted for.
pub(crate) async fn unreferenced_files(
    session: &mut dyn CatalogSession,
    candidates: Vec<String>,
) -> AppResult<Vec<String>> {
    let mut orphaned: Vec<String> = Vec::new();
    for name in candidates {
        if orphaned.contains(&name) {
            continue;
        }
        if session.is_file_referenced(&name).await? {
            tracing::debug!(filename = %name, "Stored file still referenced, keeping it");
            continue;
        }
        orphaned.push(name);
    }
    Ok(orphaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaced_file_only_reports_changed_names() {
        assert_eq!(replaced_file(Some("a.png"), Some("b.png")), Some("a.png".into()));
        assert_eq!(replaced_file(Some("a.png"), Some("a.png")), None);
        assert_eq!(replaced_file(None, Some("b.png")), None);
    }

    #[test]
    fn blank_search_is_rejected() {
        assert!(search_term("   ").is_err());
        assert_eq!(search_term("  Mika ").unwrap(), "Mika");
    }
}
