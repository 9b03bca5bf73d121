//! Enrollment model: the link between a user and a program.

use parcours_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// An enrollment row from the `enrollments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Enrollment {
    pub id: DbId,
    pub user_id: DbId,
    pub program_id: DbId,
    pub status: String,
    /// 1-based day the member is currently on.
    pub current_day: i32,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

/// Enrollment projection joining program identity, for the member's
/// "my programs" view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrollmentWithProgram {
    pub id: DbId,
    pub program_id: DbId,
    pub program_slug: String,
    pub program_title: String,
    pub status: String,
    pub current_day: i32,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}
