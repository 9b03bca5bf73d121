//! Handlers for enrollments: joining a program and managing a run.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use parcours_core::curriculum::Curriculum;
use parcours_core::error::CoreError;
use parcours_core::types::DbId;
use parcours_db::models::enrollment::Enrollment;
use parcours_db::models::status::enrollment as enrollment_status;
use parcours_db::repositories::{EnrollmentRepo, ProgramRepo, UserRepo};
use parcours_events::PlatformEvent;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /enrollments/{id}/current-day`.
#[derive(Debug, Deserialize)]
pub struct CurrentDayRequest {
    pub day: u32,
}

/// POST /api/v1/programs/{slug}/enroll
///
/// Enroll the authenticated member in a published program. Enforces the
/// per-user concurrent-programs limit and the one-row-per-pair invariant.
pub async fn enroll(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<(StatusCode, Json<DataResponse<Enrollment>>)> {
    let program = ProgramRepo::find_published_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundBySlug {
                entity: "Program",
                slug: slug.clone(),
            })
        })?;

    if EnrollmentRepo::find_by_user_and_program(&state.pool, auth.user_id, program.id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Vous êtes déjà inscrit·e à cette formation.".into(),
        )));
    }

    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    let active = EnrollmentRepo::count_active_for_user(&state.pool, auth.user_id).await?;
    if active >= user.max_active_programs as i64 {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Nombre maximal de programmes actifs atteint ({}).",
            user.max_active_programs
        ))));
    }

    let enrollment = EnrollmentRepo::create(&state.pool, auth.user_id, program.id).await?;

    state.event_bus.publish(
        PlatformEvent::new("enrollment.created")
            .with_source("enrollment", enrollment.id)
            .with_actor(auth.user_id)
            .with_payload(serde_json::json!({ "program_slug": slug })),
    );
    tracing::info!(
        enrollment_id = enrollment.id,
        user_id = auth.user_id,
        program_id = program.id,
        "Enrollment created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: enrollment }),
    ))
}

/// POST /api/v1/enrollments/{id}/pause
pub async fn pause(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(enrollment_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Enrollment>>> {
    set_status(auth, state, enrollment_id, enrollment_status::PAUSED).await
}

/// POST /api/v1/enrollments/{id}/resume
pub async fn resume(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(enrollment_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Enrollment>>> {
    set_status(auth, state, enrollment_id, enrollment_status::ACTIVE).await
}

/// POST /api/v1/enrollments/{id}/complete
pub async fn complete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(enrollment_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Enrollment>>> {
    let result = set_status(auth.clone(), state.clone(), enrollment_id, enrollment_status::COMPLETED).await;
    if result.is_ok() {
        state.event_bus.publish(
            PlatformEvent::new("enrollment.completed")
                .with_source("enrollment", enrollment_id)
                .with_actor(auth.user_id),
        );
    }
    result
}

/// PUT /api/v1/enrollments/{id}/current-day
///
/// Move to another day of the program. Days are independent: navigation
/// performs no cross-day validation, only a bounds check.
pub async fn set_current_day(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(enrollment_id): Path<DbId>,
    Json(input): Json<CurrentDayRequest>,
) -> AppResult<Json<DataResponse<Enrollment>>> {
    let enrollment = owned_enrollment(&state, &auth, enrollment_id).await?;

    let program = ProgramRepo::find_by_id(&state.pool, enrollment.program_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Program",
            id: enrollment.program_id,
        }))?;
    let curriculum = Curriculum::from_json(&program.days).map_err(AppError::Core)?;

    if input.day < 1 || input.day > curriculum.day_count() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Jour invalide : {}. Le programme compte {} jours.",
            input.day,
            curriculum.day_count()
        ))));
    }

    let updated = EnrollmentRepo::set_current_day(&state.pool, enrollment_id, input.day as i32)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Enrollment",
            id: enrollment_id,
        }))?;

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch an enrollment and check it belongs to the caller.
async fn owned_enrollment(
    state: &AppState,
    auth: &AuthUser,
    enrollment_id: DbId,
) -> AppResult<Enrollment> {
    let enrollment = EnrollmentRepo::find_by_id(&state.pool, enrollment_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Enrollment",
            id: enrollment_id,
        }))?;

    if enrollment.user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Cette inscription ne vous appartient pas.".into(),
        )));
    }
    Ok(enrollment)
}

async fn set_status(
    auth: AuthUser,
    state: AppState,
    enrollment_id: DbId,
    status: &str,
) -> AppResult<Json<DataResponse<Enrollment>>> {
    owned_enrollment(&state, &auth, enrollment_id).await?;

    let updated = EnrollmentRepo::set_status(&state.pool, enrollment_id, status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Enrollment",
            id: enrollment_id,
        }))?;

    tracing::info!(enrollment_id, status, user_id = auth.user_id, "Enrollment status changed");
    Ok(Json(DataResponse { data: updated }))
}
