//! Repository for the `categories` table.
//!
//! Categories are hard-deleted. Deletion never cascades to posts: the
//! foreign key sets `posts.category_id` NULL and the delete-preview
//! operation tells the operator how many posts will need manual
//! re-categorization.

use parcours_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::{Category, CategoryWithCount, CreateCategory, UpdateCategory};

const COLUMNS: &str = "id, slug, name, description, created_at, updated_at";

/// Provides CRUD operations for blog categories.
pub struct CategoryRepo;

impl CategoryRepo {
    pub async fn create(
        pool: &PgPool,
        slug: &str,
        input: &CreateCategory,
    ) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (slug, name, description)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(slug)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List categories with their live (non-deleted) post counts.
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<CategoryWithCount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryWithCount>(
            "SELECT c.id, c.slug, c.name, c.description,
                    COUNT(p.id) FILTER (WHERE p.deleted_at IS NULL) AS post_count,
                    c.created_at, c.updated_at
             FROM categories c
             LEFT JOIN posts p ON p.category_id = c.id
             GROUP BY c.id
             ORDER BY c.name",
        )
        .fetch_all(pool)
        .await
    }

    /// Update a category. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET
                slug = COALESCE($2, slug),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.slug)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Count live posts still referencing a category (delete dry-run).
    pub async fn count_live_posts(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM posts WHERE category_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(count.0)
    }

    /// Hard-delete a category. Posts keep a NULL category (no cascade).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
