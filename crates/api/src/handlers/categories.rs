//! Handlers for blog categories.
//!
//! Deleting a category is destructive and guarded by a dry-run preview:
//! the preview reports how many live posts still reference the category and
//! warns that they must be re-categorized manually. The delete itself never
//! cascades; dependent posts are left uncategorized.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use parcours_core::error::CoreError;
use parcours_core::types::DbId;
use parcours_db::models::category::{
    Category, CategoryWithCount, CreateCategory, UpdateCategory,
};
use parcours_db::repositories::CategoryRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::programs::resolve_slug;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for the delete dry-run preview.
#[derive(Debug, Serialize)]
pub struct DeletePreview {
    pub post_count: i64,
    pub warning: String,
}

/// GET /api/v1/categories
///
/// Public category list (with live post counts for the blog sidebar).
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<CategoryWithCount>>>> {
    let categories = CategoryRepo::list_with_counts(&state.pool).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/admin/categories
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<Category>>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Le nom est obligatoire.".into(),
        )));
    }
    let slug = resolve_slug(input.slug.as_deref(), &input.name)?;

    let category = CategoryRepo::create(&state.pool, &slug, &input).await?;

    tracing::info!(
        category_id = category.id,
        slug = %category.slug,
        admin_id = admin.user_id,
        "Category created",
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: category }),
    ))
}

/// PUT /api/v1/admin/categories/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<DataResponse<Category>>> {
    if let Some(slug) = &input.slug {
        parcours_core::slug::validate_slug(slug).map_err(AppError::Core)?;
    }

    let category = CategoryRepo::update(&state.pool, category_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }))?;

    tracing::info!(category_id, admin_id = admin.user_id, "Category updated");
    Ok(Json(DataResponse { data: category }))
}

/// GET /api/v1/admin/categories/{id}/delete-preview
///
/// Dry run: what would deleting this category affect?
pub async fn delete_preview(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
) -> AppResult<Json<DataResponse<DeletePreview>>> {
    // 404 before counting, so the modal can distinguish "gone" from "empty".
    CategoryRepo::find_by_id(&state.pool, category_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }))?;

    let post_count = CategoryRepo::count_live_posts(&state.pool, category_id).await?;
    let warning = if post_count == 0 {
        "Aucun article n'utilise cette catégorie.".to_string()
    } else {
        format!(
            "{post_count} article(s) utilisent cette catégorie et devront être \
             re-catégorisés manuellement."
        )
    };

    Ok(Json(DataResponse {
        data: DeletePreview {
            post_count,
            warning,
        },
    }))
}

/// DELETE /api/v1/admin/categories/{id}
///
/// Hard delete, no cascade: dependent posts keep running uncategorized.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = CategoryRepo::delete(&state.pool, category_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }));
    }

    tracing::info!(category_id, admin_id = admin.user_id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
