//! Handlers for blog posts: the public blog and the admin back-office.
//!
//! List filtering (free text, status, category) and the "recent" sort run
//! in-process over the full row set via `parcours_core::listing`, so the
//! public blog and the admin grid share one code path and filtered views
//! can be reproduced from query-string links.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use parcours_core::error::CoreError;
use parcours_core::listing::{apply_filter, sort_recent, ListFilter};
use parcours_core::types::DbId;
use parcours_db::models::post::{CreatePost, Post, PostListRow, UpdatePost};
use parcours_db::models::status::post as post_status;
use parcours_db::repositories::{CategoryRepo, PostRepo};
use parcours_events::PlatformEvent;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::programs::resolve_slug;
use crate::middleware::rbac::RequireAdmin;
use crate::query::ListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the admin post grid (public filters plus the
/// trash toggle).
#[derive(Debug, Default, Deserialize)]
pub struct AdminListParams {
    pub q: Option<String>,
    pub status: Option<String>,
    pub category: Option<DbId>,
    pub sort: Option<String>,
    #[serde(default)]
    pub include_deleted: bool,
}

// ---------------------------------------------------------------------------
// Public blog
// ---------------------------------------------------------------------------

/// GET /api/v1/posts
///
/// Published, non-deleted posts with `?q=&category=&sort=` filters.
pub async fn list_public(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<PostListRow>>>> {
    validate_sort(params.sort.as_deref())?;

    let rows = PostRepo::list(&state.pool, false).await?;
    let filter = ListFilter {
        query: params.q,
        // The public blog only ever shows published posts.
        status: Some(post_status::PUBLISHED.to_string()),
        category_id: params.category,
    };
    let mut visible = apply_filter(rows, &filter);
    sort_recent(&mut visible);

    Ok(Json(DataResponse { data: visible }))
}

/// GET /api/v1/posts/{slug}
pub async fn get_public(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<Post>>> {
    let post = PostRepo::find_published_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundBySlug {
                entity: "Post",
                slug: slug.clone(),
            })
        })?;
    Ok(Json(DataResponse { data: post }))
}

// ---------------------------------------------------------------------------
// Admin CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/posts
pub async fn admin_list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<AdminListParams>,
) -> AppResult<Json<DataResponse<Vec<PostListRow>>>> {
    validate_sort(params.sort.as_deref())?;
    if let Some(status) = &params.status {
        if ![post_status::DRAFT, post_status::PUBLISHED].contains(&status.as_str()) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Statut inconnu : « {status} »."
            ))));
        }
    }

    let rows = PostRepo::list(&state.pool, params.include_deleted).await?;
    let filter = ListFilter {
        query: params.q,
        status: params.status,
        category_id: params.category,
    };
    let mut visible = apply_filter(rows, &filter);
    sort_recent(&mut visible);

    Ok(Json(DataResponse { data: visible }))
}

/// POST /api/v1/admin/posts
pub async fn admin_create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreatePost>,
) -> AppResult<(StatusCode, Json<DataResponse<Post>>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Le titre est obligatoire.".into(),
        )));
    }
    let slug = resolve_slug(input.slug.as_deref(), &input.title)?;
    check_category(&state, input.category_id).await?;

    let post = PostRepo::create(&state.pool, &slug, &input).await?;

    tracing::info!(
        post_id = post.id,
        slug = %post.slug,
        admin_id = admin.user_id,
        "Post created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: post })))
}

/// GET /api/v1/admin/posts/{id}
pub async fn admin_get(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Post>>> {
    let post = PostRepo::find_by_id(&state.pool, post_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        }))?;
    Ok(Json(DataResponse { data: post }))
}

/// PUT /api/v1/admin/posts/{id}
pub async fn admin_update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
    Json(input): Json<UpdatePost>,
) -> AppResult<Json<DataResponse<Post>>> {
    if let Some(slug) = &input.slug {
        parcours_core::slug::validate_slug(slug).map_err(AppError::Core)?;
    }
    check_category(&state, input.category_id).await?;

    let post = PostRepo::update(&state.pool, post_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        }))?;

    tracing::info!(post_id, admin_id = admin.user_id, "Post updated");
    Ok(Json(DataResponse { data: post }))
}

/// POST /api/v1/admin/posts/{id}/publish
pub async fn admin_publish(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Post>>> {
    let post = PostRepo::publish(&state.pool, post_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        }))?;

    state.event_bus.publish(
        PlatformEvent::new("post.published")
            .with_source("post", post_id)
            .with_actor(admin.user_id)
            .with_payload(serde_json::json!({ "slug": post.slug })),
    );
    tracing::info!(post_id, admin_id = admin.user_id, "Post published");
    Ok(Json(DataResponse { data: post }))
}

/// POST /api/v1/admin/posts/{id}/unpublish
pub async fn admin_unpublish(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Post>>> {
    let post = PostRepo::unpublish(&state.pool, post_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        }))?;

    tracing::info!(post_id, admin_id = admin.user_id, "Post unpublished");
    Ok(Json(DataResponse { data: post }))
}

/// DELETE /api/v1/admin/posts/{id}
///
/// Soft delete (restorable).
pub async fn admin_delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = PostRepo::soft_delete(&state.pool, post_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        }));
    }

    tracing::info!(post_id, admin_id = admin.user_id, "Post soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/posts/{id}/restore
pub async fn admin_restore(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let restored = PostRepo::restore(&state.pool, post_id).await?;
    if !restored {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        }));
    }

    tracing::info!(post_id, admin_id = admin.user_id, "Post restored");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/admin/posts/{id}/purge
///
/// Hard delete. Refuses posts that are not in the trash.
pub async fn admin_purge(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let purged = PostRepo::purge(&state.pool, post_id).await?;
    if !purged {
        return Err(AppError::Core(CoreError::Conflict(
            "Seul un article dans la corbeille peut être supprimé définitivement.".into(),
        )));
    }

    tracing::info!(post_id, admin_id = admin.user_id, "Post permanently deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Only the `recent` sort key is defined; reject anything else so a typo'd
/// link fails loudly instead of silently reordering.
fn validate_sort(sort: Option<&str>) -> AppResult<()> {
    match sort {
        None | Some("recent") => Ok(()),
        Some(other) => Err(AppError::Core(CoreError::Validation(format!(
            "Tri inconnu : « {other} ». Valeur possible : recent."
        )))),
    }
}

/// Reject references to a category that does not exist.
async fn check_category(state: &AppState, category_id: Option<DbId>) -> AppResult<()> {
    if let Some(id) = category_id {
        CategoryRepo::find_by_id(&state.pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Category",
                id,
            }))?;
    }
    Ok(())
}
