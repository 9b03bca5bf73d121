//! Route definitions for the admin activity feed.

use axum::routing::get;
use axum::Router;

use crate::handlers::events;
use crate::state::AppState;

/// Activity feed routes mounted at `/admin/events` (admin only).
///
/// ```text
/// GET / -> list_recent (?limit=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(events::list_recent))
}
