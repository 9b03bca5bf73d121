//! Route definitions for admin exports.

use axum::routing::get;
use axum::Router;

use crate::handlers::exports;
use crate::state::AppState;

/// Export routes mounted at `/admin/exports` (admin only).
///
/// ```text
/// GET /day-states  -> export_day_states (?program=&from=&to=&format=json|csv)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/day-states", get(exports::export_day_states))
}
