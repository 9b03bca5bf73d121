//! Authoritative day-state model.

use parcours_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A day-state row from the `day_states` table: one user's answers and
/// completion flag for one day of one program.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DayState {
    pub id: DbId,
    pub user_id: DbId,
    pub program_id: DbId,
    pub day: i32,
    /// Flat mapping from field path to value.
    pub answers: Value,
    pub slider_before: Option<i32>,
    pub slider_after: Option<i32>,
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

/// DTO for upserting a day state.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertDayState {
    pub answers: Value,
    pub slider_before: Option<i32>,
    pub slider_after: Option<i32>,
    #[serde(default)]
    pub completed: bool,
}

/// Export projection joining user email and program slug.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DayStateExportRow {
    pub user_id: DbId,
    pub user_email: String,
    pub program_slug: String,
    pub day: i32,
    pub answers: Value,
    pub slider_before: Option<i32>,
    pub slider_after: Option<i32>,
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

/// Per-day completion aggregation for the progress view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DayProgress {
    pub day: i32,
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
}
