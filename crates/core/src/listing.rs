//! List filtering and ordering for admin grids and the blog index.
//!
//! List pages fetch the full row set and filter in-process: the visible set
//! is the intersection of the status filter, the category filter, and a
//! case-insensitive free-text match against a fixed haystack (title + slug +
//! summary + category name). Ordering is "recent": `updated_at` falling back
//! to `created_at`, descending, with ties keeping their original order.

use crate::types::{DbId, Timestamp};

/// Row shape the filters operate on. Implemented by list projections in the
/// db crate.
pub trait Listable {
    fn status(&self) -> &str;
    fn category_id(&self) -> Option<DbId>;
    /// Free-text search haystack: title + slug + summary + category name.
    fn haystack(&self) -> String;
    fn updated_at(&self) -> Option<Timestamp>;
    fn created_at(&self) -> Timestamp;
}

/// Filter criteria for a list page, usually taken from query parameters.
#[derive(Debug, Default, Clone)]
pub struct ListFilter {
    pub query: Option<String>,
    pub status: Option<String>,
    pub category_id: Option<DbId>,
}

impl ListFilter {
    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.status.is_none() && self.category_id.is_none()
    }
}

/// Case-insensitive substring match of every whitespace-separated term.
pub fn matches_query(haystack: &str, query: &str) -> bool {
    let haystack = haystack.to_lowercase();
    query
        .split_whitespace()
        .all(|term| haystack.contains(&term.to_lowercase()))
}

/// Keep only rows matching every active criterion.
pub fn apply_filter<T: Listable>(rows: Vec<T>, filter: &ListFilter) -> Vec<T> {
    rows.into_iter()
        .filter(|row| {
            if let Some(status) = &filter.status {
                if row.status() != status {
                    return false;
                }
            }
            if let Some(category_id) = filter.category_id {
                if row.category_id() != Some(category_id) {
                    return false;
                }
            }
            if let Some(query) = &filter.query {
                if !query.trim().is_empty() && !matches_query(&row.haystack(), query) {
                    return false;
                }
            }
            true
        })
        .collect()
}

/// The sort key for "recent" ordering.
pub fn recency(row: &impl Listable) -> Timestamp {
    row.updated_at().unwrap_or_else(|| row.created_at())
}

/// Sort rows most-recent first. `sort_by` is stable, so rows with equal
/// recency keep their original order.
pub fn sort_recent<T: Listable>(rows: &mut [T]) {
    rows.sort_by(|a, b| recency(b).cmp(&recency(a)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    struct Row {
        title: &'static str,
        slug: &'static str,
        summary: &'static str,
        category_name: &'static str,
        status: &'static str,
        category_id: Option<DbId>,
        created_at: Timestamp,
        updated_at: Option<Timestamp>,
    }

    impl Listable for Row {
        fn status(&self) -> &str {
            self.status
        }
        fn category_id(&self) -> Option<DbId> {
            self.category_id
        }
        fn haystack(&self) -> String {
            format!(
                "{} {} {} {}",
                self.title, self.slug, self.summary, self.category_name
            )
        }
        fn updated_at(&self) -> Option<Timestamp> {
            self.updated_at
        }
        fn created_at(&self) -> Timestamp {
            self.created_at
        }
    }

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn row(
        title: &'static str,
        status: &'static str,
        category_id: Option<DbId>,
        created: i64,
        updated: Option<i64>,
    ) -> Row {
        Row {
            title,
            slug: "slug",
            summary: "résumé",
            category_name: "Sommeil",
            status,
            category_id,
            created_at: at(created),
            updated_at: updated.map(at),
        }
    }

    #[test]
    fn filter_is_the_intersection_of_all_criteria() {
        let rows = vec![
            row("Bien dormir", "published", Some(1), 10, None),
            row("Bien dormir", "draft", Some(1), 20, None),
            row("Respirer", "published", Some(2), 30, None),
            row("Mieux dormir", "published", Some(1), 40, None),
        ];

        let filter = ListFilter {
            query: Some("dormir".into()),
            status: Some("published".into()),
            category_id: Some(1),
        };

        let visible = apply_filter(rows, &filter);
        let titles: Vec<_> = visible.iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["Bien dormir", "Mieux dormir"]);
    }

    #[test]
    fn query_matches_case_insensitively_across_the_haystack() {
        assert!(matches_query("Bien dormir slug résumé Sommeil", "DORMIR"));
        assert!(matches_query("Bien dormir slug résumé Sommeil", "sommeil"));
        // Every term must match.
        assert!(!matches_query("Bien dormir slug résumé Sommeil", "dormir yoga"));
        // The category name is part of the haystack.
        let rows = vec![row("Relaxation", "published", Some(1), 10, None)];
        let filter = ListFilter {
            query: Some("sommeil".into()),
            ..Default::default()
        };
        assert_eq!(apply_filter(rows, &filter).len(), 1);
    }

    #[test]
    fn blank_query_matches_everything() {
        let rows = vec![row("A", "draft", None, 1, None)];
        let filter = ListFilter {
            query: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(apply_filter(rows, &filter).len(), 1);
    }

    #[test]
    fn recent_sort_uses_updated_at_then_created_at() {
        let mut rows = vec![
            row("created-late", "draft", None, 50, None),
            row("updated-latest", "draft", None, 10, Some(100)),
            row("created-early", "draft", None, 20, None),
        ];
        sort_recent(&mut rows);
        let titles: Vec<_> = rows.iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["updated-latest", "created-late", "created-early"]);
    }

    #[test]
    fn recent_sort_is_stable_on_ties() {
        let mut rows = vec![
            row("first", "draft", None, 10, Some(100)),
            row("second", "draft", None, 20, Some(100)),
            row("third", "draft", None, 30, Some(100)),
        ];
        sort_recent(&mut rows);
        let titles: Vec<_> = rows.iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }
}
