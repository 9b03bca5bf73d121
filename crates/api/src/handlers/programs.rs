//! Handlers for programs: the public catalogue and the admin back-office.
//!
//! Admin mutations follow the publish pipeline draft → preflight →
//! published; publishing validates the slug, pricing, and that the JSON
//! curriculum parses into at least one day.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use parcours_core::curriculum::Curriculum;
use parcours_core::error::CoreError;
use parcours_core::slug::{slugify, validate_slug};
use parcours_core::types::DbId;
use parcours_db::models::program::{CreateProgram, Program, ProgramListRow, UpdateProgram};
use parcours_db::models::status::program as program_status;
use parcours_db::repositories::ProgramRepo;
use parcours_events::PlatformEvent;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Public catalogue
// ---------------------------------------------------------------------------

/// GET /api/v1/programs
///
/// Published programs only.
pub async fn list_published(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ProgramListRow>>>> {
    let programs = ProgramRepo::list_published(&state.pool).await?;
    Ok(Json(DataResponse { data: programs }))
}

/// GET /api/v1/programs/{slug}
pub async fn get_published(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<Program>>> {
    let program = ProgramRepo::find_published_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundBySlug {
                entity: "Program",
                slug: slug.clone(),
            })
        })?;
    Ok(Json(DataResponse { data: program }))
}

// ---------------------------------------------------------------------------
// Admin CRUD
// ---------------------------------------------------------------------------

/// Request body for `POST /admin/programs/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// GET /api/v1/admin/programs
pub async fn admin_list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ProgramListRow>>>> {
    let programs = ProgramRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: programs }))
}

/// POST /api/v1/admin/programs
pub async fn admin_create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateProgram>,
) -> AppResult<(StatusCode, Json<DataResponse<Program>>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Le titre est obligatoire.".into(),
        )));
    }
    let slug = resolve_slug(input.slug.as_deref(), &input.title)?;

    if let Some(days) = &input.days {
        Curriculum::from_json(days).map_err(AppError::Core)?;
    }
    if input.price_cents < 0 {
        return Err(AppError::Core(CoreError::Validation(
            "Le prix ne peut pas être négatif.".into(),
        )));
    }

    let program = ProgramRepo::create(&state.pool, &slug, &input).await?;

    tracing::info!(
        program_id = program.id,
        slug = %program.slug,
        admin_id = admin.user_id,
        "Program created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: program }),
    ))
}

/// GET /api/v1/admin/programs/{id}
pub async fn admin_get(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(program_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Program>>> {
    let program = ProgramRepo::find_by_id(&state.pool, program_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Program",
            id: program_id,
        }))?;
    Ok(Json(DataResponse { data: program }))
}

/// PUT /api/v1/admin/programs/{id}
pub async fn admin_update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(program_id): Path<DbId>,
    Json(input): Json<UpdateProgram>,
) -> AppResult<Json<DataResponse<Program>>> {
    if let Some(slug) = &input.slug {
        validate_slug(slug).map_err(AppError::Core)?;
    }
    if let Some(days) = &input.days {
        Curriculum::from_json(days).map_err(AppError::Core)?;
    }
    if let Some(price) = input.price_cents {
        if price < 0 {
            return Err(AppError::Core(CoreError::Validation(
                "Le prix ne peut pas être négatif.".into(),
            )));
        }
    }

    let program = ProgramRepo::update(&state.pool, program_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Program",
            id: program_id,
        }))?;

    tracing::info!(program_id, admin_id = admin.user_id, "Program updated");
    Ok(Json(DataResponse { data: program }))
}

/// POST /api/v1/admin/programs/{id}/status
///
/// Move a program along the publish pipeline. Publishing runs the
/// preflight checks once more.
pub async fn admin_set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(program_id): Path<DbId>,
    Json(input): Json<StatusRequest>,
) -> AppResult<Json<DataResponse<Program>>> {
    if !program_status::ALL.contains(&input.status.as_str()) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Statut inconnu : « {} ».",
            input.status
        ))));
    }

    let program = ProgramRepo::find_by_id(&state.pool, program_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Program",
            id: program_id,
        }))?;

    if !program_status::can_transition(&program.status, &input.status) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Transition impossible : {} → {}.",
            program.status, input.status
        ))));
    }

    if input.status == program_status::PUBLISHED {
        check_publishable(&program)?;
    }

    let updated = ProgramRepo::set_status(&state.pool, program_id, &input.status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Program",
            id: program_id,
        }))?;

    if input.status == program_status::PUBLISHED {
        state.event_bus.publish(
            PlatformEvent::new("program.published")
                .with_source("program", program_id)
                .with_actor(admin.user_id)
                .with_payload(serde_json::json!({ "slug": updated.slug })),
        );
    }
    tracing::info!(
        program_id,
        status = %input.status,
        admin_id = admin.user_id,
        "Program status changed",
    );

    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/admin/programs/{id}
///
/// Hard delete. Only drafts can be removed; anything that went through
/// preflight may have enrollments and must be withdrawn instead.
pub async fn admin_delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(program_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let program = ProgramRepo::find_by_id(&state.pool, program_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Program",
            id: program_id,
        }))?;

    if program.status != program_status::DRAFT {
        return Err(AppError::Core(CoreError::Conflict(
            "Seule une formation en brouillon peut être supprimée.".into(),
        )));
    }

    ProgramRepo::delete(&state.pool, program_id).await?;

    state.event_bus.publish(
        PlatformEvent::new("program.deleted")
            .with_source("program", program_id)
            .with_actor(admin.user_id),
    );
    tracing::info!(program_id, admin_id = admin.user_id, "Program deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the slug for a new entity: explicit slugs are validated,
/// otherwise one is derived from the title.
pub(crate) fn resolve_slug(explicit: Option<&str>, title: &str) -> AppResult<String> {
    match explicit {
        Some(slug) => {
            validate_slug(slug).map_err(AppError::Core)?;
            Ok(slug.to_string())
        }
        None => slugify(title).ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "Impossible de générer un slug à partir du titre.".into(),
            ))
        }),
    }
}

/// Preflight checks run before a program goes live.
fn check_publishable(program: &Program) -> AppResult<()> {
    let curriculum = Curriculum::from_json(&program.days).map_err(AppError::Core)?;
    if curriculum.day_count() == 0 {
        return Err(AppError::Core(CoreError::Validation(
            "Impossible de publier : le programme ne contient aucune journée.".into(),
        )));
    }
    if program.summary.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Impossible de publier : le résumé est obligatoire.".into(),
        )));
    }
    Ok(())
}
