//! Route definitions for the newsletter.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::newsletter;
use crate::state::AppState;

/// Public subscription routes mounted at `/newsletter`.
///
/// ```text
/// POST /subscribe    -> subscribe
/// GET  /confirm      -> confirm (?token=)
/// POST /unsubscribe  -> unsubscribe
/// ```
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/subscribe", post(newsletter::subscribe))
        .route("/confirm", get(newsletter::confirm))
        .route("/unsubscribe", post(newsletter::unsubscribe))
}

/// Back-office routes mounted at `/admin/subscribers` (admin only).
///
/// ```text
/// GET  /              -> admin_list (?status=&tag=&q=)
/// POST /{id}/status   -> admin_set_status
/// PUT  /{id}/tags     -> admin_set_tags
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(newsletter::admin_list))
        .route("/{id}/status", post(newsletter::admin_set_status))
        .route("/{id}/tags", put(newsletter::admin_set_tags))
}
