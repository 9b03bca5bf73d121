//! Repository for the `enrollments` table.

use parcours_core::types::DbId;
use sqlx::PgPool;

use crate::models::enrollment::{Enrollment, EnrollmentWithProgram};

const COLUMNS: &str = "id, user_id, program_id, status, current_day, started_at, completed_at, \
                        created_at, updated_at";

/// Provides enrollment lifecycle operations.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Enroll a user in a program. The unique pair constraint surfaces a
    /// conflict when the user is already enrolled.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        program_id: DbId,
    ) -> Result<Enrollment, sqlx::Error> {
        let query = format!(
            "INSERT INTO enrollments (user_id, program_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(user_id)
            .bind(program_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM enrollments WHERE id = $1");
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_user_and_program(
        pool: &PgPool,
        user_id: DbId,
        program_id: DbId,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM enrollments WHERE user_id = $1 AND program_id = $2"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(user_id)
            .bind(program_id)
            .fetch_optional(pool)
            .await
    }

    /// A member's enrollments with program identity, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<EnrollmentWithProgram>, sqlx::Error> {
        sqlx::query_as::<_, EnrollmentWithProgram>(
            "SELECT e.id, e.program_id, p.slug AS program_slug, p.title AS program_title,
                    e.status, e.current_day, e.started_at, e.completed_at
             FROM enrollments e
             JOIN programs p ON p.id = e.program_id
             WHERE e.user_id = $1
             ORDER BY e.started_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Count a user's active enrollments (for the concurrency limit).
    pub async fn count_active_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM enrollments WHERE user_id = $1 AND status = 'active'",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(count.0)
    }

    /// Set an enrollment status; stamps `completed_at` on completion.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "UPDATE enrollments SET
                status = $2,
                completed_at = CASE WHEN $2 = 'completed'
                                    THEN COALESCE(completed_at, NOW())
                                    ELSE completed_at END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Move the member to another day of the program.
    pub async fn set_current_day(
        pool: &PgPool,
        id: DbId,
        day: i32,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "UPDATE enrollments SET current_day = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(id)
            .bind(day)
            .fetch_optional(pool)
            .await
    }
}
