//! Route definitions for programs and the member runner.
//!
//! Two routers are provided:
//! - `public_router()` for the catalogue + runner, mounted at `/programs`
//! - `admin_router()` for the back-office, mounted at `/admin/programs`

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{enrollments, programs, runner};
use crate::state::AppState;

/// Catalogue and runner routes mounted at `/programs`.
///
/// ```text
/// GET /                                    -> list_published
/// GET /{slug}                              -> get_published
/// POST /{slug}/enroll                      -> enroll (auth)
/// GET /{slug}/progress                     -> get_progress (auth)
/// GET /{slug}/last-day                     -> get_last_day
/// GET /{slug}/days/{day}                   -> get_day
/// GET /{slug}/days/{day}/draft             -> get_draft
/// PUT /{slug}/days/{day}/draft/values      -> put_draft_value
/// GET /{slug}/days/{day}/draft/save-state  -> get_save_state
/// PUT /{slug}/days/{day}/complete          -> complete_day (auth)
/// ```
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(programs::list_published))
        .route("/{slug}", get(programs::get_published))
        .route("/{slug}/enroll", post(enrollments::enroll))
        .route("/{slug}/progress", get(runner::get_progress))
        .route("/{slug}/last-day", get(runner::get_last_day))
        .route("/{slug}/days/{day}", get(runner::get_day))
        .route("/{slug}/days/{day}/draft", get(runner::get_draft))
        .route(
            "/{slug}/days/{day}/draft/values",
            put(runner::put_draft_value),
        )
        .route(
            "/{slug}/days/{day}/draft/save-state",
            get(runner::get_save_state),
        )
        .route("/{slug}/days/{day}/complete", put(runner::complete_day))
}

/// Back-office routes mounted at `/admin/programs` (admin only).
///
/// ```text
/// GET    /             -> admin_list
/// POST   /             -> admin_create
/// GET    /{id}         -> admin_get
/// PUT    /{id}         -> admin_update
/// DELETE /{id}         -> admin_delete (drafts only)
/// POST   /{id}/status  -> admin_set_status
/// ```
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(programs::admin_list).post(programs::admin_create))
        .route(
            "/{id}",
            get(programs::admin_get)
                .put(programs::admin_update)
                .delete(programs::admin_delete),
        )
        .route("/{id}/status", post(programs::admin_set_status))
}
