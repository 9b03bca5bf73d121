//! Repository for the `programs` table.

use parcours_core::types::DbId;
use sqlx::PgPool;

use crate::models::program::{CreateProgram, Program, ProgramListRow, UpdateProgram};

const COLUMNS: &str = "id, slug, title, summary, status, price_cents, currency, hero, benefits, \
                        faq, seo, days, published_at, created_at, updated_at";

const LIST_COLUMNS: &str = "id, slug, title, summary, status, price_cents, currency, \
                             published_at, created_at, updated_at";

/// Provides CRUD operations for programs.
pub struct ProgramRepo;

impl ProgramRepo {
    /// Insert a new program (status starts at `draft`).
    ///
    /// `slug` must already be resolved by the caller (explicit or slugified).
    pub async fn create(
        pool: &PgPool,
        slug: &str,
        input: &CreateProgram,
    ) -> Result<Program, sqlx::Error> {
        let query = format!(
            "INSERT INTO programs (slug, title, summary, price_cents, currency,
                                   hero, benefits, faq, seo, days)
             VALUES ($1, $2, $3, $4, $5,
                     COALESCE($6, '{{}}'::jsonb), COALESCE($7, '[]'::jsonb),
                     COALESCE($8, '[]'::jsonb), COALESCE($9, '{{}}'::jsonb),
                     COALESCE($10, '[]'::jsonb))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Program>(&query)
            .bind(slug)
            .bind(&input.title)
            .bind(&input.summary)
            .bind(input.price_cents)
            .bind(input.currency.as_deref().unwrap_or("EUR"))
            .bind(&input.hero)
            .bind(&input.benefits)
            .bind(&input.faq)
            .bind(&input.seo)
            .bind(&input.days)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Program>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM programs WHERE id = $1");
        sqlx::query_as::<_, Program>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Program>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM programs WHERE slug = $1");
        sqlx::query_as::<_, Program>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Find a published program by slug (member-facing lookup).
    pub async fn find_published_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Program>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM programs WHERE slug = $1 AND status = 'published'");
        sqlx::query_as::<_, Program>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// List all programs for the admin grid, most recently touched first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<ProgramListRow>, sqlx::Error> {
        let query = format!(
            "SELECT {LIST_COLUMNS} FROM programs
             ORDER BY COALESCE(updated_at, created_at) DESC, id"
        );
        sqlx::query_as::<_, ProgramListRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// List published programs for the public catalogue.
    pub async fn list_published(pool: &PgPool) -> Result<Vec<ProgramListRow>, sqlx::Error> {
        let query = format!(
            "SELECT {LIST_COLUMNS} FROM programs WHERE status = 'published'
             ORDER BY published_at DESC NULLS LAST, id"
        );
        sqlx::query_as::<_, ProgramListRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a program. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProgram,
    ) -> Result<Option<Program>, sqlx::Error> {
        let query = format!(
            "UPDATE programs SET
                slug = COALESCE($2, slug),
                title = COALESCE($3, title),
                summary = COALESCE($4, summary),
                price_cents = COALESCE($5, price_cents),
                currency = COALESCE($6, currency),
                hero = COALESCE($7, hero),
                benefits = COALESCE($8, benefits),
                faq = COALESCE($9, faq),
                seo = COALESCE($10, seo),
                days = COALESCE($11, days),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Program>(&query)
            .bind(id)
            .bind(&input.slug)
            .bind(&input.title)
            .bind(&input.summary)
            .bind(input.price_cents)
            .bind(&input.currency)
            .bind(&input.hero)
            .bind(&input.benefits)
            .bind(&input.faq)
            .bind(&input.seo)
            .bind(&input.days)
            .fetch_optional(pool)
            .await
    }

    /// Set a program's status; stamps `published_at` on publish.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Program>, sqlx::Error> {
        let query = format!(
            "UPDATE programs SET
                status = $2,
                published_at = CASE WHEN $2 = 'published'
                                    THEN COALESCE(published_at, NOW())
                                    ELSE published_at END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Program>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a program. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM programs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
