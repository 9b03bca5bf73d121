//! Route definitions for blog posts.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::posts;
use crate::state::AppState;

/// Public blog routes mounted at `/posts`.
///
/// ```text
/// GET /        -> list_public (?q=&category=&sort=)
/// GET /{slug}  -> get_public
/// ```
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(posts::list_public))
        .route("/{slug}", get(posts::get_public))
}

/// Back-office routes mounted at `/admin/posts` (admin only).
///
/// ```text
/// GET    /                -> admin_list (?q=&status=&category=&sort=&include_deleted=)
/// POST   /                -> admin_create
/// GET    /{id}            -> admin_get
/// PUT    /{id}            -> admin_update
/// DELETE /{id}            -> admin_delete (soft)
/// POST   /{id}/publish    -> admin_publish
/// POST   /{id}/unpublish  -> admin_unpublish
/// POST   /{id}/restore    -> admin_restore
/// DELETE /{id}/purge      -> admin_purge (hard)
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(posts::admin_list).post(posts::admin_create))
        .route(
            "/{id}",
            get(posts::admin_get)
                .put(posts::admin_update)
                .delete(posts::admin_delete),
        )
        .route("/{id}/publish", post(posts::admin_publish))
        .route("/{id}/unpublish", post(posts::admin_unpublish))
        .route("/{id}/restore", post(posts::admin_restore))
        .route("/{id}/purge", delete(posts::admin_purge))
}
