//! Blog post model and DTOs.

use parcours_core::listing::Listable;
use parcours_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A post row from the `posts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Post {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub body: String,
    pub category_id: Option<DbId>,
    pub status: String,
    pub published_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

/// List projection joining the category name, used by the blog index and
/// admin grid. Implements [`Listable`] so the shared filter/sort logic
/// applies.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostListRow {
    pub id: DbId,
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub status: String,
    pub published_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

impl Listable for PostListRow {
    fn status(&self) -> &str {
        &self.status
    }

    fn category_id(&self) -> Option<DbId> {
        self.category_id
    }

    fn haystack(&self) -> String {
        format!(
            "{} {} {} {}",
            self.title,
            self.slug,
            self.summary,
            self.category_name.as_deref().unwrap_or("")
        )
    }

    fn updated_at(&self) -> Option<Timestamp> {
        self.updated_at
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

/// DTO for creating a post.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePost {
    pub slug: Option<String>,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub body: String,
    pub category_id: Option<DbId>,
}

/// DTO for updating a post. All fields are optional.
///
/// `remove_category` clears the category reference (JSON cannot distinguish
/// "absent" from "null" on `category_id` alone); it is how an operator
/// re-categorizes a post to "none" after a category deletion.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePost {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub category_id: Option<DbId>,
    #[serde(default)]
    pub remove_category: bool,
}
