//! Shared query parameter types for API handlers.
//!
//! Common query structs that appear across multiple handler modules are
//! extracted here to avoid duplication.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Default and maximum limits for paginated feeds.
pub const DEFAULT_FEED_LIMIT: i64 = 50;
pub const MAX_FEED_LIMIT: i64 = 200;

impl PaginationParams {
    /// The effective limit, clamped to `[1, MAX_FEED_LIMIT]`.
    pub fn clamped_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_FEED_LIMIT).clamp(1, MAX_FEED_LIMIT)
    }
}

/// Shared list filters for the blog and admin grids
/// (`?q=&status=&category=&sort=`).
///
/// These mirror the URL search params a list page accepts so filtered views
/// can be shared via link.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Free-text search.
    pub q: Option<String>,
    /// Status filter (resource-specific values).
    pub status: Option<String>,
    /// Category id filter.
    pub category: Option<i64>,
    /// Sort key; only `recent` is currently defined.
    pub sort: Option<String>,
}
