//! Repository for the `subscribers` table.

use parcours_core::types::DbId;
use serde_json::Value;
use sqlx::PgPool;

use crate::models::subscriber::Subscriber;

const COLUMNS: &str = "id, email, status, tags, confirmation_token_hash, confirmation_sent_at, \
                        confirmed_at, created_at, updated_at";

/// Filters for the admin subscriber grid.
#[derive(Debug, Default)]
pub struct SubscriberFilter {
    pub status: Option<String>,
    pub tag: Option<String>,
    /// Case-insensitive substring match on the email.
    pub query: Option<String>,
}

/// Provides newsletter subscriber operations.
pub struct SubscriberRepo;

impl SubscriberRepo {
    /// Create a pending subscriber, or re-arm an existing row for a new
    /// confirmation cycle (re-subscribe after unsubscribing).
    ///
    /// The confirmation token is generated later by the mailer worker:
    /// clearing `confirmation_sent_at` here is what queues the row.
    pub async fn upsert_pending(pool: &PgPool, email: &str) -> Result<Subscriber, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscribers (email, status)
             VALUES (LOWER($1), 'pending')
             ON CONFLICT ON CONSTRAINT uq_subscribers_email DO UPDATE SET
                status = 'pending',
                confirmation_token_hash = NULL,
                confirmation_sent_at = NULL,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(email)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Subscriber>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscribers WHERE id = $1");
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<Subscriber>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscribers WHERE email = LOWER($1)");
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a pending subscriber by confirmation token hash.
    pub async fn find_by_confirmation_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Subscriber>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscribers
             WHERE confirmation_token_hash = $1 AND status = 'pending'"
        );
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Filtered subscriber list for the admin grid, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &SubscriberFilter,
    ) -> Result<Vec<Subscriber>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscribers
             WHERE ($1::text IS NULL OR status = $1)
               AND ($2::text IS NULL OR tags ? $2)
               AND ($3::text IS NULL OR email ILIKE '%' || $3 || '%')
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(&filter.status)
            .bind(&filter.tag)
            .bind(&filter.query)
            .fetch_all(pool)
            .await
    }

    /// Set a subscriber's status. Transition legality is checked by the
    /// caller against `parcours_core::newsletter`.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Subscriber>, sqlx::Error> {
        let query = format!(
            "UPDATE subscribers SET
                status = $2,
                confirmed_at = CASE WHEN $2 = 'confirmed'
                                    THEN COALESCE(confirmed_at, NOW())
                                    ELSE confirmed_at END,
                confirmation_token_hash = CASE WHEN $2 = 'confirmed'
                                               THEN NULL
                                               ELSE confirmation_token_hash END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Replace a subscriber's tag list.
    pub async fn set_tags(
        pool: &PgPool,
        id: DbId,
        tags: &Value,
    ) -> Result<Option<Subscriber>, sqlx::Error> {
        let query = format!(
            "UPDATE subscribers SET tags = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(id)
            .bind(tags)
            .fetch_optional(pool)
            .await
    }

    /// Pending subscribers whose confirmation email has not been sent yet.
    pub async fn list_pending_unsent(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<Subscriber>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM subscribers
             WHERE status = 'pending' AND confirmation_sent_at IS NULL
             ORDER BY created_at
             LIMIT $1"
        );
        sqlx::query_as::<_, Subscriber>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Store the hash of a freshly generated confirmation token.
    pub async fn arm_confirmation(
        pool: &PgPool,
        id: DbId,
        token_hash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE subscribers SET confirmation_token_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(token_hash)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Stamp `confirmation_sent_at` after the mailer delivered the email.
    pub async fn mark_confirmation_sent(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE subscribers SET confirmation_sent_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
