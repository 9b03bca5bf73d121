//! Blog category model and DTOs.

use parcours_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A category row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

/// Category projection with its live post count, for admin grids.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryWithCount {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub post_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

/// DTO for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub slug: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// DTO for updating a category. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCategory {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}
