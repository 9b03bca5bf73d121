//! Debounced draft persistence for the program runner.
//!
//! While a learner fills out a day's exercises, every change lands in a
//! [`DraftCache`] keyed by (user, program slug, day). The cache coalesces
//! rapid edits and writes the whole answer map to a [`DraftStorage`] after a
//! short quiet period, alongside a "last visited day" marker. Drafts are a
//! convenience cache, not the system of record: storage failures are
//! swallowed on save and yield an empty map on load.
//!
//! The storage backend is injected rather than ambient, so the API server
//! wires in a database-backed store while tests use [`MemoryStorage`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::day_state::{self, AnswerMap};

/// Quiet period before a pending draft is written out.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(800);

/// How long the "saved" indicator lingers before resetting to idle.
pub const SAVED_RESET_DELAY: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Storage trait
// ---------------------------------------------------------------------------

/// Error type for draft storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Draft storage unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store backing the draft cache.
#[async_trait]
pub trait DraftStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory [`DraftStorage`] used by tests and preview deployments.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl DraftStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Save state indicator
// ---------------------------------------------------------------------------

/// Transient autosave indicator surfaced to the runner UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveState {
    Idle,
    Saving,
    Saved,
}

// ---------------------------------------------------------------------------
// DraftCache
// ---------------------------------------------------------------------------

struct Entry {
    answers: AnswerMap,
    /// Bumped on every edit; a scheduled flush only fires if it still holds
    /// the generation it was scheduled with.
    generation: u64,
    state: SaveState,
}

/// Debounced draft cache over an injected [`DraftStorage`].
///
/// Cheap to clone; clones share the same pending state and storage.
#[derive(Clone)]
pub struct DraftCache {
    storage: Arc<dyn DraftStorage>,
    debounce: Duration,
    saved_reset: Duration,
    inner: Arc<Mutex<HashMap<String, Entry>>>,
}

impl DraftCache {
    pub fn new(storage: Arc<dyn DraftStorage>) -> Self {
        Self::with_timing(storage, DEBOUNCE_DELAY, SAVED_RESET_DELAY)
    }

    /// Construct with explicit timing, for tests.
    pub fn with_timing(
        storage: Arc<dyn DraftStorage>,
        debounce: Duration,
        saved_reset: Duration,
    ) -> Self {
        Self {
            storage,
            debounce,
            saved_reset,
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Load the draft answers for a day.
    ///
    /// Pending unflushed edits win over stored state. A stored value under
    /// the legacy unscoped key is migrated to the user-scoped key once
    /// (copied, then the legacy key is deleted). Storage errors and corrupt
    /// payloads yield an empty map.
    pub async fn load(&self, user_key: &str, program_slug: &str, day: u32) -> AnswerMap {
        let key = day_state::draft_key(user_key, program_slug, day);

        if let Some(entry) = self.inner.lock().unwrap().get(&key) {
            return entry.answers.clone();
        }

        let raw = match self.storage.get(&key).await {
            Ok(Some(raw)) => Some(raw),
            Ok(None) => self.migrate_legacy(&key, program_slug, day).await,
            Err(e) => {
                tracing::debug!(key, error = %e, "Draft load failed, starting empty");
                None
            }
        };

        raw.map(|r| day_state::parse_answers(&r)).unwrap_or_default()
    }

    /// One-time migration from the legacy unscoped key format.
    async fn migrate_legacy(&self, new_key: &str, program_slug: &str, day: u32) -> Option<String> {
        let legacy_key = day_state::legacy_draft_key(program_slug, day);
        let raw = self.storage.get(&legacy_key).await.ok()??;

        // Copy first; only drop the legacy key once the copy landed.
        match self.storage.put(new_key, &raw).await {
            Ok(()) => {
                if let Err(e) = self.storage.remove(&legacy_key).await {
                    tracing::debug!(legacy_key, error = %e, "Legacy draft key removal failed");
                }
                tracing::debug!(legacy_key, new_key, "Migrated legacy draft key");
            }
            Err(e) => {
                tracing::debug!(new_key, error = %e, "Legacy draft migration write failed");
            }
        }
        Some(raw)
    }

    /// Record one field value and schedule a debounced flush.
    ///
    /// Returns the indicator state after the edit (always `Saving`). The
    /// eventual write is fire-and-forget; failures are swallowed.
    pub async fn set_value(
        &self,
        user_key: &str,
        program_slug: &str,
        day: u32,
        field_path: &str,
        value: Value,
    ) -> SaveState {
        let key = day_state::draft_key(user_key, program_slug, day);

        // Seed the pending entry from storage on first edit. Done outside
        // the lock; a concurrent first edit just wins the entry insert.
        let needs_seed = !self.inner.lock().unwrap().contains_key(&key);
        let seed = if needs_seed {
            Some(self.load(user_key, program_slug, day).await)
        } else {
            None
        };

        let generation = {
            let mut inner = self.inner.lock().unwrap();
            let entry = inner.entry(key.clone()).or_insert_with(|| Entry {
                answers: seed.unwrap_or_default(),
                generation: 0,
                state: SaveState::Idle,
            });
            entry.answers.insert(field_path.to_string(), value);
            entry.generation += 1;
            entry.state = SaveState::Saving;
            entry.generation
        };

        self.spawn_flush(key, user_key.to_string(), program_slug.to_string(), day, generation);
        SaveState::Saving
    }

    /// Current autosave indicator for a day's draft.
    pub fn save_state(&self, user_key: &str, program_slug: &str, day: u32) -> SaveState {
        let key = day_state::draft_key(user_key, program_slug, day);
        self.inner
            .lock()
            .unwrap()
            .get(&key)
            .map(|e| e.state)
            .unwrap_or(SaveState::Idle)
    }

    /// The most recently saved day number for a user and program, if any.
    pub async fn last_day(&self, user_key: &str, program_slug: &str) -> Option<u32> {
        let key = day_state::last_day_key(user_key, program_slug);
        self.storage
            .get(&key)
            .await
            .ok()
            .flatten()
            .and_then(|raw| raw.parse().ok())
    }

    /// Schedule the debounced write for a given edit generation.
    ///
    /// If another edit arrives before the quiet period elapses, this flush
    /// is superseded and does nothing; the newer task writes the full map.
    fn spawn_flush(
        &self,
        key: String,
        user_key: String,
        program_slug: String,
        day: u32,
        generation: u64,
    ) {
        let cache = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(cache.debounce).await;

            let payload = {
                let inner = cache.inner.lock().unwrap();
                match inner.get(&key) {
                    Some(e) if e.generation == generation => {
                        Some(day_state::serialize_answers(&e.answers))
                    }
                    _ => None, // superseded by a newer edit
                }
            };
            let Some(payload) = payload else { return };

            if let Err(e) = cache.storage.put(&key, &payload).await {
                tracing::debug!(key, error = %e, "Draft save failed (ignored)");
            }
            let last_day = day_state::last_day_key(&user_key, &program_slug);
            if let Err(e) = cache.storage.put(&last_day, &day.to_string()).await {
                tracing::debug!(key = last_day, error = %e, "Last-day save failed (ignored)");
            }

            // The indicator cycles saved -> idle regardless of outcome.
            cache.mark(&key, generation, SaveState::Saved);
            tokio::time::sleep(cache.saved_reset).await;
            cache.mark(&key, generation, SaveState::Idle);
        });
    }

    fn mark(&self, key: &str, generation: u64, state: SaveState) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner.get_mut(key) {
            if entry.generation == generation {
                entry.state = state;
            }
        }
    }
}
