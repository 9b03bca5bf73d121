//! Handlers for the member program runner.
//!
//! A day's in-progress answers live in the draft cache (debounced,
//! fire-and-forget, keyed by user / program slug / day); completing a day
//! writes the authoritative `day_states` row. Unauthenticated preview access
//! uses the anonymous draft namespace and cannot complete days.

use axum::extract::{Path, State};
use axum::Json;
use parcours_core::curriculum::{Curriculum, DayDefinition, FieldKind};
use parcours_core::day_state::AnswerMap;
use parcours_core::draft::SaveState;
use parcours_core::error::CoreError;
use parcours_core::roles::ROLE_ADMIN;
use parcours_db::models::day_state::{DayProgress, DayState, UpsertDayState};
use parcours_db::models::program::Program;
use parcours_db::repositories::{DayStateRepo, EnrollmentRepo, ProgramRepo};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::response::DataResponse;
use crate::state::AppState;

/// Range for the before/after session sliders.
const SESSION_SLIDER_MIN: i32 = 0;
const SESSION_SLIDER_MAX: i32 = 10;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Response body for the day view.
#[derive(Debug, Serialize)]
pub struct DayView {
    pub day: DayDefinition,
    pub day_count: u32,
}

/// Request body for `PUT .../draft/values`.
#[derive(Debug, Deserialize)]
pub struct DraftValueRequest {
    /// Field path, e.g. `ex.breathing.duration`.
    pub path: String,
    pub value: Value,
}

/// Response body for draft save operations and the save-state poll.
#[derive(Debug, Serialize)]
pub struct SaveStateResponse {
    pub save_state: SaveState,
}

/// Response body for the last-day lookup.
#[derive(Debug, Serialize)]
pub struct LastDayResponse {
    pub last_day: Option<u32>,
}

/// Response body for the progress view.
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub days: Vec<DayProgress>,
    pub completed_count: usize,
    pub day_count: u32,
}

// ---------------------------------------------------------------------------
// Day view
// ---------------------------------------------------------------------------

/// GET /api/v1/programs/{slug}/days/{day}
///
/// The day definition for rendering. Published programs are visible to
/// everyone (anonymous preview included); admins can also preview drafts.
pub async fn get_day(
    auth: MaybeAuthUser,
    State(state): State<AppState>,
    Path((slug, day)): Path<(String, u32)>,
) -> AppResult<Json<DataResponse<DayView>>> {
    let program = runner_program(&state, &auth, &slug).await?;
    let curriculum = Curriculum::from_json(&program.days).map_err(AppError::Core)?;

    let definition = curriculum.day(day).cloned().ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Jour invalide : {day}. Le programme compte {} jours.",
            curriculum.day_count()
        )))
    })?;

    Ok(Json(DataResponse {
        data: DayView {
            day: definition,
            day_count: curriculum.day_count(),
        },
    }))
}

// ---------------------------------------------------------------------------
// Draft cache
// ---------------------------------------------------------------------------

/// GET /api/v1/programs/{slug}/days/{day}/draft
///
/// The draft answers for a day. Loading runs the one-time legacy key
/// migration; a missing or corrupt draft yields an empty map.
pub async fn get_draft(
    auth: MaybeAuthUser,
    State(state): State<AppState>,
    Path((slug, day)): Path<(String, u32)>,
) -> AppResult<Json<DataResponse<AnswerMap>>> {
    runner_program(&state, &auth, &slug).await?;
    let answers = state.draft_cache.load(&auth.draft_key(), &slug, day).await;
    Ok(Json(DataResponse { data: answers }))
}

/// PUT /api/v1/programs/{slug}/days/{day}/draft/values
///
/// Record one field value. The value is checked against the field's kind
/// (sliders are clamped instead of rejected) and queued for a debounced,
/// fire-and-forget write.
pub async fn put_draft_value(
    auth: MaybeAuthUser,
    State(state): State<AppState>,
    Path((slug, day)): Path<(String, u32)>,
    Json(input): Json<DraftValueRequest>,
) -> AppResult<Json<SaveStateResponse>> {
    let program = runner_program(&state, &auth, &slug).await?;
    let curriculum = Curriculum::from_json(&program.days).map_err(AppError::Core)?;
    let definition = curriculum.day(day).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!("Jour invalide : {day}.")))
    })?;

    let kind = definition.resolve_path(&input.path).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Champ inconnu : {}.",
            input.path
        )))
    })?;

    let value = match kind {
        // Sliders clamp out-of-range input instead of rejecting it.
        FieldKind::Slider { .. } => kind.clamp(input.value),
        _ => {
            kind.validate_value(&input.value).map_err(AppError::Core)?;
            input.value
        }
    };

    let save_state = state
        .draft_cache
        .set_value(&auth.draft_key(), &slug, day, &input.path, value)
        .await;

    Ok(Json(SaveStateResponse { save_state }))
}

/// GET /api/v1/programs/{slug}/days/{day}/draft/save-state
pub async fn get_save_state(
    auth: MaybeAuthUser,
    State(state): State<AppState>,
    Path((slug, day)): Path<(String, u32)>,
) -> AppResult<Json<SaveStateResponse>> {
    let save_state = state.draft_cache.save_state(&auth.draft_key(), &slug, day);
    Ok(Json(SaveStateResponse { save_state }))
}

/// GET /api/v1/programs/{slug}/last-day
///
/// The most recently saved day for this user and program, for "resume
/// where you left off" navigation.
pub async fn get_last_day(
    auth: MaybeAuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<LastDayResponse>>> {
    let last_day = state.draft_cache.last_day(&auth.draft_key(), &slug).await;
    Ok(Json(DataResponse {
        data: LastDayResponse { last_day },
    }))
}

// ---------------------------------------------------------------------------
// Authoritative day state
// ---------------------------------------------------------------------------

/// PUT /api/v1/programs/{slug}/days/{day}/complete
///
/// Upsert the authoritative day state (answers snapshot, session sliders,
/// completion flag). Requires an enrollment.
pub async fn complete_day(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((slug, day)): Path<(String, u32)>,
    Json(mut input): Json<UpsertDayState>,
) -> AppResult<Json<DataResponse<DayState>>> {
    let (program, _enrollment) = enrolled_program(&state, &auth, &slug).await?;

    let curriculum = Curriculum::from_json(&program.days).map_err(AppError::Core)?;
    let definition = curriculum.day(day).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!("Jour invalide : {day}.")))
    })?;

    // Validate every answer against the field it targets.
    let answers = input.answers.as_object().ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "Les réponses doivent être un objet.".into(),
        ))
    })?;
    for (path, value) in answers {
        let kind = definition.resolve_path(path).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!("Champ inconnu : {path}.")))
        })?;
        kind.validate_value(value).map_err(AppError::Core)?;
    }

    input.slider_before = input
        .slider_before
        .map(|v| v.clamp(SESSION_SLIDER_MIN, SESSION_SLIDER_MAX));
    input.slider_after = input
        .slider_after
        .map(|v| v.clamp(SESSION_SLIDER_MIN, SESSION_SLIDER_MAX));

    let day_state =
        DayStateRepo::upsert(&state.pool, auth.user_id, program.id, day as i32, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        program_id = program.id,
        day,
        completed = input.completed,
        "Day state saved",
    );

    Ok(Json(DataResponse { data: day_state }))
}

/// GET /api/v1/programs/{slug}/progress
///
/// Per-day completion aggregation for the authenticated member.
pub async fn get_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<ProgressResponse>>> {
    let (program, _enrollment) = enrolled_program(&state, &auth, &slug).await?;
    let curriculum = Curriculum::from_json(&program.days).map_err(AppError::Core)?;

    let days = DayStateRepo::progress(&state.pool, auth.user_id, program.id).await?;
    let completed_count = days.iter().filter(|d| d.completed).count();

    Ok(Json(DataResponse {
        data: ProgressResponse {
            days,
            completed_count,
            day_count: curriculum.day_count(),
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the program a runner request targets.
///
/// Published programs are visible to everyone; admins may also preview
/// unpublished ones.
async fn runner_program(
    state: &AppState,
    auth: &MaybeAuthUser,
    slug: &str,
) -> AppResult<Program> {
    let is_admin = auth
        .0
        .as_ref()
        .map(|u| u.role == ROLE_ADMIN)
        .unwrap_or(false);

    let program = if is_admin {
        ProgramRepo::find_by_slug(&state.pool, slug).await?
    } else {
        ProgramRepo::find_published_by_slug(&state.pool, slug).await?
    };

    program.ok_or_else(|| {
        AppError::Core(CoreError::NotFoundBySlug {
            entity: "Program",
            slug: slug.to_string(),
        })
    })
}

/// Resolve a published program and the caller's enrollment in it.
async fn enrolled_program(
    state: &AppState,
    auth: &AuthUser,
    slug: &str,
) -> AppResult<(Program, parcours_db::models::enrollment::Enrollment)> {
    let program = ProgramRepo::find_published_by_slug(&state.pool, slug)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFoundBySlug {
                entity: "Program",
                slug: slug.to_string(),
            })
        })?;

    let enrollment =
        EnrollmentRepo::find_by_user_and_program(&state.pool, auth.user_id, program.id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Forbidden(
                    "Vous n'êtes pas inscrit·e à cette formation.".into(),
                ))
            })?;

    Ok((program, enrollment))
}
