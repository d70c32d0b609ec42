//! Substring search helpers for catalog lookups.
//!
//! Catalog search is a case-insensitive `ILIKE` match on names and titles.
//! User input is trimmed and LIKE metacharacters are escaped so a query for
//! `100%` matches the literal text.

/// Escape character used in generated LIKE patterns.
pub const LIKE_ESCAPE: char = '\\';

/// Normalize a raw search query. Returns `None` for blank input.
pub fn normalize_query(query: &str) -> Option<String> {
    let collapsed = query.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Build a `%term%` pattern with `%`, `_` and `\` escaped.
///
/// # Examples
///
/// ```
/// use illustra_core::search::contains_pattern;
/// assert_eq!(contains_pattern("cat"), "%cat%");
/// assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
/// ```
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Case-insensitive substring match with the same semantics as the SQL
/// pattern produced by [`contains_pattern`].
pub fn matches_query(haystack: &str, term: &str) -> bool {
    haystack.to_lowercase().contains(&term.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_blank_returns_none() {
        assert_eq!(normalize_query(""), None);
        assert_eq!(normalize_query("   \t "), None);
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(
            normalize_query("  red   dragon "),
            Some("red dragon".to_string())
        );
    }

    #[test]
    fn pattern_escapes_metacharacters() {
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c\\d"), "%c\\\\d%");
    }

    #[test]
    fn matches_ignores_case() {
        assert!(matches_query("Winter Festival", "festival"));
        assert!(!matches_query("Winter Festival", "summer"));
    }
}
