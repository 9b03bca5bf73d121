//! Admin activity feed (`/admin/events`).

use axum::extract::{Query, State};
use axum::Json;
use parcours_db::models::event::EventRow;
use parcours_db::repositories::EventRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/events
///
/// Most recent platform events, newest first.
pub async fn list_recent(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<EventRow>>>> {
    let events = EventRepo::list_recent(&state.pool, params.clamped_limit()).await?;
    Ok(Json(DataResponse { data: events }))
}
