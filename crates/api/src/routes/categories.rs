//! Route definitions for blog categories.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::categories;
use crate::state::AppState;

/// Public category routes mounted at `/categories`.
///
/// ```text
/// GET / -> list
/// ```
pub fn public_router() -> Router<AppState> {
    Router::new().route("/", get(categories::list))
}

/// Back-office routes mounted at `/admin/categories` (admin only).
///
/// ```text
/// POST   /                      -> create
/// PUT    /{id}                  -> update
/// DELETE /{id}                  -> delete (hard, no cascade)
/// GET    /{id}/delete-preview   -> delete_preview (dry run)
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", post(categories::create))
        .route(
            "/{id}",
            axum::routing::put(categories::update).delete(categories::delete),
        )
        .route("/{id}/delete-preview", get(categories::delete_preview))
}
