//! Route definitions for the authenticated member's own profile.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::me;
use crate::state::AppState;

/// Profile routes mounted at `/me`.
///
/// ```text
/// GET /              -> get_me
/// PUT /              -> update_me
/// PUT /theme         -> update_theme
/// PUT /marketing     -> update_marketing
/// GET /enrollments   -> list_my_enrollments
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(me::get_me).put(me::update_me))
        .route("/theme", put(me::update_theme))
        .route("/marketing", put(me::update_marketing))
        .route("/enrollments", get(me::list_my_enrollments))
}
