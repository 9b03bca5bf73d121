//! Handlers for the authenticated member's own profile (`/me`).

use axum::extract::State;
use axum::Json;
use parcours_core::error::CoreError;
use parcours_db::models::user::{UpdateUser, UserResponse};
use parcours_db::repositories::{EnrollmentRepo, UserRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Allowed values for the theme preference.
const VALID_THEMES: &[&str] = &["light", "dark", "system"];

/// Request body for `PUT /me/theme`.
#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: String,
}

/// Request body for `PUT /me/marketing`.
#[derive(Debug, Deserialize)]
pub struct MarketingRequest {
    pub marketing_opt_in: bool,
}

/// Request body for `PUT /me`.
#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub display_name: String,
}

/// GET /api/v1/me
pub async fn get_me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/me
///
/// Update the member's display name.
pub async fn update_me(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ProfileRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let display_name = input.display_name.trim();
    if display_name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Le nom est obligatoire.".into(),
        )));
    }

    let user = UserRepo::update(
        &state.pool,
        auth.user_id,
        &UpdateUser {
            display_name: Some(display_name.to_string()),
            theme: None,
            marketing_opt_in: None,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "User",
        id: auth.user_id,
    }))?;

    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/me/theme
pub async fn update_theme(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ThemeRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if !VALID_THEMES.contains(&input.theme.as_str()) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Thème inconnu : « {} ». Valeurs possibles : light, dark, system.",
            input.theme
        ))));
    }

    let user = UserRepo::update(
        &state.pool,
        auth.user_id,
        &UpdateUser {
            display_name: None,
            theme: Some(input.theme),
            marketing_opt_in: None,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "User",
        id: auth.user_id,
    }))?;

    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/me/marketing
pub async fn update_marketing(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<MarketingRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::update(
        &state.pool,
        auth.user_id,
        &UpdateUser {
            display_name: None,
            theme: None,
            marketing_opt_in: Some(input.marketing_opt_in),
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "User",
        id: auth.user_id,
    }))?;

    Ok(Json(DataResponse { data: user.into() }))
}

/// GET /api/v1/me/enrollments
pub async fn list_my_enrollments(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<parcours_db::models::enrollment::EnrollmentWithProgram>>>> {
    let enrollments = EnrollmentRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: enrollments }))
}
