use std::sync::Arc;

use parcours_core::draft::DraftCache;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: parcours_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<parcours_events::EventBus>,
    /// Debounced draft cache for the program runner.
    pub draft_cache: DraftCache,
}
