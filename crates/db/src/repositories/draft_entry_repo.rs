//! Repository for the `draft_entries` key-value table.
//!
//! Backs the database implementation of
//! `parcours_core::draft::DraftStorage` used by the program runner.

use sqlx::PgPool;

/// Provides raw key-value access to draft entries.
pub struct DraftEntryRepo;

impl DraftEntryRepo {
    pub async fn get(pool: &PgPool, key: &str) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM draft_entries WHERE key = $1")
                .bind(key)
                .fetch_optional(pool)
                .await?;
        Ok(row.map(|(v,)| v))
    }

    pub async fn put(pool: &PgPool, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO draft_entries (key, value)
             VALUES ($1, $2)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn remove(pool: &PgPool, key: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM draft_entries WHERE key = $1")
            .bind(key)
            .execute(pool)
            .await?;
        Ok(())
    }
}
