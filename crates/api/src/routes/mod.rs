pub mod auth;
pub mod categories;
pub mod enrollments;
pub mod events;
pub mod exports;
pub mod health;
pub mod me;
pub mod newsletter;
pub mod posts;
pub mod programs;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
///
/// /me                                              get, update profile
/// /me/theme                                        update theme preference
/// /me/marketing                                    update marketing opt-in
/// /me/enrollments                                  my programs
///
/// /programs                                        published catalogue (GET)
/// /programs/{slug}                                 program detail (GET)
/// /programs/{slug}/enroll                          enroll (POST, auth)
/// /programs/{slug}/progress                        per-day completion (GET, auth)
/// /programs/{slug}/last-day                        resume navigation (GET)
/// /programs/{slug}/days/{day}                      day definition (GET)
/// /programs/{slug}/days/{day}/draft                draft answers (GET)
/// /programs/{slug}/days/{day}/draft/values         record one value (PUT)
/// /programs/{slug}/days/{day}/draft/save-state     autosave indicator (GET)
/// /programs/{slug}/days/{day}/complete             authoritative day state (PUT, auth)
///
/// /enrollments/{id}/pause                          pause (POST, auth)
/// /enrollments/{id}/resume                         resume (POST, auth)
/// /enrollments/{id}/complete                       complete (POST, auth)
/// /enrollments/{id}/current-day                    day navigation (PUT, auth)
///
/// /posts                                           public blog (?q=&category=&sort=)
/// /posts/{slug}                                    article (GET)
/// /categories                                      category list with post counts
///
/// /newsletter/subscribe                            double-opt-in start (POST)
/// /newsletter/confirm                              confirm (?token=) (GET)
/// /newsletter/unsubscribe                          unsubscribe (POST)
///
/// /admin/users                                     list, create (admin only)
/// /admin/users/{id}                                get, update
/// /admin/users/{id}/role                           change role (PUT)
/// /admin/users/{id}/limits                         change limits (PUT)
/// /admin/users/{id}/suspend                        suspend (POST)
/// /admin/users/{id}/unsuspend                      lift suspension (POST)
/// /admin/users/{id}/archive                        soft delete (POST)
/// /admin/users/{id}/restore                        restore (POST)
/// /admin/users/{id}/purge                          irreversible delete (DELETE)
///
/// /admin/programs                                  list, create
/// /admin/programs/{id}                             get, update, delete (drafts only)
/// /admin/programs/{id}/status                      publish pipeline (POST)
///
/// /admin/posts                                     list, create (?include_deleted=)
/// /admin/posts/{id}                                get, update, soft delete
/// /admin/posts/{id}/publish                        publish (POST)
/// /admin/posts/{id}/unpublish                      unpublish (POST)
/// /admin/posts/{id}/restore                        restore (POST)
/// /admin/posts/{id}/purge                          hard delete (DELETE)
///
/// /admin/categories                                create
/// /admin/categories/{id}                           update, hard delete (no cascade)
/// /admin/categories/{id}/delete-preview            dry run (GET)
///
/// /admin/subscribers                               list (?status=&tag=&q=)
/// /admin/subscribers/{id}/status                   status transition (POST)
/// /admin/subscribers/{id}/tags                     replace tags (PUT)
///
/// /admin/exports/day-states                        export (?format=json|csv)
/// /admin/events                                    activity feed (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (register, login, refresh, logout).
        .nest("/auth", auth::router())
        // The authenticated member's own profile.
        .nest("/me", me::router())
        // Public catalogue + member runner.
        .nest("/programs", programs::public_router())
        // Enrollment lifecycle actions.
        .nest("/enrollments", enrollments::router())
        // Public blog.
        .nest("/posts", posts::public_router())
        .nest("/categories", categories::public_router())
        // Newsletter double-opt-in lifecycle.
        .nest("/newsletter", newsletter::public_router())
        // Admin back-office.
        .nest("/admin/users", users::router())
        .nest("/admin/programs", programs::admin_router())
        .nest("/admin/posts", posts::admin_router())
        .nest("/admin/categories", categories::admin_router())
        .nest("/admin/subscribers", newsletter::admin_router())
        .nest("/admin/exports", exports::router())
        .nest("/admin/events", events::router())
}
