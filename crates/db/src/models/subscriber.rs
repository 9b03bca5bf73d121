//! Newsletter subscriber model and DTOs.

use parcours_core::types::{DbId, Timestamp};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

/// Full subscriber row from the `subscribers` table.
///
/// Contains the confirmation token hash -- use [`SubscriberResponse`] for
/// API output.
#[derive(Debug, Clone, FromRow)]
pub struct Subscriber {
    pub id: DbId,
    pub email: String,
    pub status: String,
    /// JSON array of tag strings.
    pub tags: Value,
    pub confirmation_token_hash: Option<String>,
    pub confirmation_sent_at: Option<Timestamp>,
    pub confirmed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

/// Safe subscriber representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriberResponse {
    pub id: DbId,
    pub email: String,
    pub status: String,
    pub tags: Value,
    pub confirmation_sent_at: Option<Timestamp>,
    pub confirmed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

impl From<Subscriber> for SubscriberResponse {
    fn from(s: Subscriber) -> Self {
        SubscriberResponse {
            id: s.id,
            email: s.email,
            status: s.status,
            tags: s.tags,
            confirmation_sent_at: s.confirmation_sent_at,
            confirmed_at: s.confirmed_at,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}
