//! Pagination defaults and clamping for list and search endpoints.

/// Default number of rows per page.
pub const DEFAULT_LIMIT: i64 = 20;

/// Maximum number of rows per page.
pub const MAX_LIMIT: i64 = 100;

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Resolve `(limit, offset)` with the catalog defaults applied.
pub fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        clamp_limit(limit, DEFAULT_LIMIT, MAX_LIMIT),
        clamp_offset(offset),
    )
}
