//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped with [`illustra_core::pagination::page_bounds`] before
/// they reach the store.
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Clamped `(limit, offset)`.
    pub fn bounds(&self) -> (i64, i64) {
        illustra_core::pagination::page_bounds(self.limit, self.offset)
    }
}

/// Search parameters (`?q=&limit=&offset=`).
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchParams {
    /// Clamped `(limit, offset)`.
    pub fn bounds(&self) -> (i64, i64) {
        illustra_core::pagination::page_bounds(self.limit, self.offset)
    }
}
