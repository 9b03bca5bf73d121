//! Route definitions for enrollment lifecycle actions.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::enrollments;
use crate::state::AppState;

/// Enrollment routes mounted at `/enrollments` (auth required).
///
/// ```text
/// POST /{id}/pause        -> pause
/// POST /{id}/resume       -> resume
/// POST /{id}/complete     -> complete
/// PUT  /{id}/current-day  -> set_current_day
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/pause", post(enrollments::pause))
        .route("/{id}/resume", post(enrollments::resume))
        .route("/{id}/complete", post(enrollments::complete))
        .route("/{id}/current-day", put(enrollments::set_current_day))
}
