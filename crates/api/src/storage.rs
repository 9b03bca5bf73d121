//! Database-backed implementation of the draft storage seam.
//!
//! `parcours_core::draft::DraftCache` takes its storage as an injected
//! handle; in production that handle is this Postgres-backed store over the
//! `draft_entries` table.

use async_trait::async_trait;
use parcours_core::draft::{DraftStorage, StorageError};
use parcours_db::repositories::DraftEntryRepo;
use parcours_db::DbPool;

/// [`DraftStorage`] over the `draft_entries` table.
pub struct PgDraftStorage {
    pool: DbPool,
}

impl PgDraftStorage {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DraftStorage for PgDraftStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        DraftEntryRepo::get(&self.pool, key)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        DraftEntryRepo::put(&self.pool, key, value)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        DraftEntryRepo::remove(&self.pool, key)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}
