use sea_orm::sea_query::LikeExpr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;

/// Result of a name search: the number of matches and the matching records.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults<T> {
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> From<Vec<T>> for SearchResults<T> {
    fn from(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

const LIKE_ESCAPE: char = '!';

/// Escape LIKE wildcards so the term matches literally.
pub fn like_pattern(search_term: &str) -> String {
    let mut escaped = String::with_capacity(search_term.len() + 2);
    escaped.push('%');
    for c in search_term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Apply case-insensitive substring search to a single column using SQLite's LIKE operator.
///
/// The empty term is not special-cased: `%%` matches every row. Case folding
/// covers ASCII letters only, so `é` and `É` are different characters here.
pub fn apply_text_search<T, C>(
    query: sea_orm::Select<T>,
    column: C,
    search_term: &str,
) -> sea_orm::Select<T>
where
    T: EntityTrait,
    C: ColumnTrait,
{
    query.filter(column.like(LikeExpr::new(like_pattern(search_term)).escape(LIKE_ESCAPE)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_term() {
        assert_eq!(like_pattern("Hop"), "%Hop%");
    }

    #[test]
    fn test_like_pattern_empty_term_matches_all() {
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%_!"), "%100!%!_!!%");
    }

    #[test]
    fn test_search_results_count_matches_data() {
        let results = SearchResults::from(vec!["a", "b"]);
        assert_eq!(results.count, 2);
        assert_eq!(results.data, vec!["a", "b"]);
    }
}
