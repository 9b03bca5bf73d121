//! Program entity model and DTOs.

use parcours_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A program row from the `programs` table.
///
/// `days` holds the JSON curriculum consumed by the member runner; it is
/// parsed into `parcours_core::curriculum::Curriculum` where structure
/// matters.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Program {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub status: String,
    pub price_cents: i32,
    pub currency: String,
    pub hero: Value,
    pub benefits: Value,
    pub faq: Value,
    pub seo: Value,
    pub days: Value,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

/// Lightweight projection for list pages (omits the curriculum and
/// marketing payloads).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProgramListRow {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub status: String,
    pub price_cents: i32,
    pub currency: String,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

/// DTO for creating a new program.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProgram {
    /// Derived from the title when omitted.
    pub slug: Option<String>,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub price_cents: i32,
    pub currency: Option<String>,
    pub hero: Option<Value>,
    pub benefits: Option<Value>,
    pub faq: Option<Value>,
    pub seo: Option<Value>,
    pub days: Option<Value>,
}

/// DTO for updating an existing program. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProgram {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub price_cents: Option<i32>,
    pub currency: Option<String>,
    pub hero: Option<Value>,
    pub benefits: Option<Value>,
    pub faq: Option<Value>,
    pub seo: Option<Value>,
    pub days: Option<Value>,
}
