//! Route definitions for admin user management.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// User management routes mounted at `/admin/users` (admin only).
///
/// ```text
/// GET    /                 -> list_users (?include_archived=)
/// POST   /                 -> create_user
/// GET    /{id}             -> get_user
/// PUT    /{id}             -> update_user
/// PUT    /{id}/role        -> set_role
/// PUT    /{id}/limits      -> set_limits
/// POST   /{id}/suspend     -> suspend
/// POST   /{id}/unsuspend   -> unsuspend
/// POST   /{id}/archive     -> archive (soft delete)
/// POST   /{id}/restore     -> restore
/// DELETE /{id}/purge       -> purge (irreversible, archived only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/{id}", get(users::get_user).put(users::update_user))
        .route("/{id}/role", put(users::set_role))
        .route("/{id}/limits", put(users::set_limits))
        .route("/{id}/suspend", post(users::suspend))
        .route("/{id}/unsuspend", post(users::unsuspend))
        .route("/{id}/archive", post(users::archive))
        .route("/{id}/restore", post(users::restore))
        .route("/{id}/purge", delete(users::purge))
}
