//! Repository for the `day_states` table.
//!
//! Day states are append/update only: completing a day upserts on the
//! (user, program, day) key and rows are never deleted by product code.

use parcours_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::day_state::{DayProgress, DayState, DayStateExportRow, UpsertDayState};

const COLUMNS: &str = "id, user_id, program_id, day, answers, slider_before, slider_after, \
                        completed, completed_at, created_at, updated_at";

/// Filters for the admin day-state export.
#[derive(Debug, Default)]
pub struct DayStateExportFilter {
    /// Restrict to one program by slug.
    pub program_slug: Option<String>,
    /// Only rows updated at or after this instant.
    pub from: Option<Timestamp>,
    /// Only rows updated before this instant.
    pub to: Option<Timestamp>,
}

/// Provides day-state persistence and aggregation.
pub struct DayStateRepo;

impl DayStateRepo {
    /// Insert or update the day state for (user, program, day).
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        program_id: DbId,
        day: i32,
        input: &UpsertDayState,
    ) -> Result<DayState, sqlx::Error> {
        let query = format!(
            "INSERT INTO day_states (user_id, program_id, day, answers, slider_before,
                                     slider_after, completed, completed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7,
                     CASE WHEN $7 THEN NOW() ELSE NULL END)
             ON CONFLICT ON CONSTRAINT uq_day_states_user_program_day DO UPDATE SET
                answers = EXCLUDED.answers,
                slider_before = EXCLUDED.slider_before,
                slider_after = EXCLUDED.slider_after,
                completed = EXCLUDED.completed,
                completed_at = CASE WHEN EXCLUDED.completed
                                    THEN COALESCE(day_states.completed_at, NOW())
                                    ELSE NULL END,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DayState>(&query)
            .bind(user_id)
            .bind(program_id)
            .bind(day)
            .bind(&input.answers)
            .bind(input.slider_before)
            .bind(input.slider_after)
            .bind(input.completed)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        program_id: DbId,
        day: i32,
    ) -> Result<Option<DayState>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM day_states
             WHERE user_id = $1 AND program_id = $2 AND day = $3"
        );
        sqlx::query_as::<_, DayState>(&query)
            .bind(user_id)
            .bind(program_id)
            .bind(day)
            .fetch_optional(pool)
            .await
    }

    /// Per-day completion for one member's run of a program.
    pub async fn progress(
        pool: &PgPool,
        user_id: DbId,
        program_id: DbId,
    ) -> Result<Vec<DayProgress>, sqlx::Error> {
        sqlx::query_as::<_, DayProgress>(
            "SELECT day, completed, completed_at FROM day_states
             WHERE user_id = $1 AND program_id = $2
             ORDER BY day",
        )
        .bind(user_id)
        .bind(program_id)
        .fetch_all(pool)
        .await
    }

    /// Rows for the admin export, joined with user email and program slug.
    pub async fn export(
        pool: &PgPool,
        filter: &DayStateExportFilter,
    ) -> Result<Vec<DayStateExportRow>, sqlx::Error> {
        sqlx::query_as::<_, DayStateExportRow>(
            "SELECT ds.user_id, u.email AS user_email, p.slug AS program_slug, ds.day,
                    ds.answers, ds.slider_before, ds.slider_after, ds.completed,
                    ds.completed_at, ds.updated_at
             FROM day_states ds
             JOIN users u ON u.id = ds.user_id
             JOIN programs p ON p.id = ds.program_id
             WHERE ($1::text IS NULL OR p.slug = $1)
               AND ($2::timestamptz IS NULL OR COALESCE(ds.updated_at, ds.created_at) >= $2)
               AND ($3::timestamptz IS NULL OR COALESCE(ds.updated_at, ds.created_at) < $3)
             ORDER BY p.slug, ds.user_id, ds.day",
        )
        .bind(&filter.program_slug)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(pool)
        .await
    }
}
