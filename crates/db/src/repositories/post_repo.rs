//! Repository for the `posts` table.

use parcours_core::types::DbId;
use sqlx::PgPool;

use crate::models::post::{CreatePost, Post, PostListRow, UpdatePost};

const COLUMNS: &str = "id, slug, title, summary, body, category_id, status, published_at, \
                        deleted_at, created_at, updated_at";

/// Columns for the list projection (with joined category name).
const LIST_SELECT: &str = "SELECT p.id, p.slug, p.title, p.summary, p.category_id,
                                   c.name AS category_name, p.status, p.published_at,
                                   p.deleted_at, p.created_at, p.updated_at
                            FROM posts p
                            LEFT JOIN categories c ON c.id = p.category_id";

/// Provides CRUD operations for blog posts.
pub struct PostRepo;

impl PostRepo {
    pub async fn create(pool: &PgPool, slug: &str, input: &CreatePost) -> Result<Post, sqlx::Error> {
        let query = format!(
            "INSERT INTO posts (slug, title, summary, body, category_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(slug)
            .bind(&input.title)
            .bind(&input.summary)
            .bind(&input.body)
            .bind(input.category_id)
            .fetch_one(pool)
            .await
    }

    /// Find a live post by internal ID (soft-deleted rows are hidden).
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a live, published post by slug (public blog lookup).
    pub async fn find_published_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM posts
             WHERE slug = $1 AND status = 'published' AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Full list with category names, most recently touched first.
    ///
    /// Soft-deleted posts are hidden unless `include_deleted`. Filtering by
    /// status/category/search happens in-process via
    /// `parcours_core::listing` so the admin grid and the blog share one
    /// code path.
    pub async fn list(pool: &PgPool, include_deleted: bool) -> Result<Vec<PostListRow>, sqlx::Error> {
        let query = if include_deleted {
            format!("{LIST_SELECT} ORDER BY COALESCE(p.updated_at, p.created_at) DESC, p.id")
        } else {
            format!(
                "{LIST_SELECT} WHERE p.deleted_at IS NULL
                 ORDER BY COALESCE(p.updated_at, p.created_at) DESC, p.id"
            )
        };
        sqlx::query_as::<_, PostListRow>(&query).fetch_all(pool).await
    }

    /// Update a post. Only non-`None` fields are applied;
    /// `input.remove_category` clears the category reference.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePost,
    ) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "UPDATE posts SET
                slug = COALESCE($2, slug),
                title = COALESCE($3, title),
                summary = COALESCE($4, summary),
                body = COALESCE($5, body),
                category_id = CASE WHEN $7 THEN NULL ELSE COALESCE($6, category_id) END,
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(&input.slug)
            .bind(&input.title)
            .bind(&input.summary)
            .bind(&input.body)
            .bind(input.category_id)
            .bind(input.remove_category)
            .fetch_optional(pool)
            .await
    }

    /// Publish a post, stamping `published_at` on first publish.
    pub async fn publish(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "UPDATE posts SET
                status = 'published',
                published_at = COALESCE(published_at, NOW()),
                updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Return a post to draft.
    pub async fn unpublish(pool: &PgPool, id: DbId) -> Result<Option<Post>, sqlx::Error> {
        let query = format!(
            "UPDATE posts SET status = 'draft', updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a post. Idempotent: returns `false` when already deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE posts SET deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted post.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE posts SET deleted_at = NULL, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete a soft-deleted post. Refuses live rows.
    pub async fn purge(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND deleted_at IS NOT NULL")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
