//! Admin handlers for user management (`/admin/users`).
//!
//! Covers the account lifecycle: role changes, suspension, archiving (soft
//! delete), restore, and the irreversible purge of archived accounts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use parcours_core::error::CoreError;
use parcours_core::roles::{ROLE_ADMIN, ROLE_MEMBER};
use parcours_core::types::DbId;
use parcours_db::models::user::{CreateUser, UpdateUser, UserResponse};
use parcours_db::repositories::{SessionRepo, UserRepo};
use parcours_events::PlatformEvent;
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::flatten_validation_errors;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query parameters for the user list.
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    #[serde(default)]
    pub include_archived: bool,
}

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct AdminCreateUser {
    #[validate(email(message = "Adresse e-mail invalide."))]
    pub email: String,
    #[validate(length(min = 1, message = "Le nom est obligatoire."))]
    pub display_name: String,
    pub password: String,
    /// `member` (default) or `admin`.
    pub role: Option<String>,
}

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

/// Request body for `PUT /admin/users/{id}/limits`.
#[derive(Debug, Deserialize)]
pub struct LimitsRequest {
    pub max_active_programs: i32,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool, params.include_archived).await?;
    let data = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/admin/users
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<AdminCreateUser>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(flatten_validation_errors(&e))))?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let role = input.role.as_deref().unwrap_or(ROLE_MEMBER);
    validate_role(role)?;

    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Cette adresse e-mail est déjà utilisée.".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: input.email.trim().to_lowercase(),
            display_name: input.display_name.trim().to_string(),
            password_hash,
            role: role.to_string(),
            marketing_opt_in: false,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, admin_id = admin.user_id, "User created by admin");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: user.into() }),
    ))
}

/// GET /api/v1/admin/users/{id}
pub async fn get_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/admin/users/{id}
pub async fn update_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if let Some(theme) = &input.theme {
        if !["light", "dark", "system"].contains(&theme.as_str()) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Thème inconnu : « {theme} »."
            ))));
        }
    }

    let user = UserRepo::update(&state.pool, user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/admin/users/{id}/role
pub async fn set_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<RoleRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    validate_role(&input.role)?;

    // An admin demoting their own account is an easy way to lock everyone
    // out of the back-office.
    if user_id == admin.user_id && input.role != ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Validation(
            "Vous ne pouvez pas retirer votre propre rôle administrateur.".into(),
        )));
    }

    let user = UserRepo::set_role(&state.pool, user_id, &input.role)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    tracing::info!(user_id, role = %input.role, admin_id = admin.user_id, "User role changed");
    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/admin/users/{id}/limits
pub async fn set_limits(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Json(input): Json<LimitsRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if !(1..=50).contains(&input.max_active_programs) {
        return Err(AppError::Core(CoreError::Validation(
            "Le nombre maximal de programmes actifs doit être entre 1 et 50.".into(),
        )));
    }

    let user = UserRepo::set_limits(&state.pool, user_id, input.max_active_programs)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    tracing::info!(
        user_id,
        max_active_programs = input.max_active_programs,
        admin_id = admin.user_id,
        "User limits changed"
    );
    Ok(Json(DataResponse { data: user.into() }))
}

/// POST /api/v1/admin/users/{id}/suspend
///
/// Suspends the account and revokes every active session.
pub async fn suspend(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let changed = UserRepo::suspend(&state.pool, user_id).await?;
    if !changed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }));
    }
    SessionRepo::revoke_all_for_user(&state.pool, user_id).await?;

    state.event_bus.publish(
        PlatformEvent::new("user.suspended")
            .with_source("user", user_id)
            .with_actor(admin.user_id),
    );
    tracing::info!(user_id, admin_id = admin.user_id, "User suspended");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/unsuspend
pub async fn unsuspend(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let changed = UserRepo::unsuspend(&state.pool, user_id).await?;
    if !changed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }));
    }
    tracing::info!(user_id, admin_id = admin.user_id, "User suspension lifted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/archive
///
/// Soft-deletes the account (restorable) and revokes its sessions.
pub async fn archive(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if user_id == admin.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "Vous ne pouvez pas archiver votre propre compte.".into(),
        )));
    }

    let changed = UserRepo::archive(&state.pool, user_id).await?;
    if !changed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }));
    }
    SessionRepo::revoke_all_for_user(&state.pool, user_id).await?;

    state.event_bus.publish(
        PlatformEvent::new("user.archived")
            .with_source("user", user_id)
            .with_actor(admin.user_id),
    );
    tracing::info!(user_id, admin_id = admin.user_id, "User archived");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/restore
pub async fn restore(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let changed = UserRepo::restore(&state.pool, user_id).await?;
    if !changed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }));
    }
    tracing::info!(user_id, admin_id = admin.user_id, "User restored");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/admin/users/{id}/purge
///
/// Irreversibly deletes an archived account. Refuses live accounts.
pub async fn purge(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let user = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;

    if !user.is_archived() {
        return Err(AppError::Core(CoreError::Conflict(
            "Le compte doit être archivé avant d'être supprimé définitivement.".into(),
        )));
    }

    UserRepo::purge(&state.pool, user_id).await?;

    tracing::info!(user_id, admin_id = admin.user_id, "User permanently deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_role(role: &str) -> AppResult<()> {
    if role == ROLE_MEMBER || role == ROLE_ADMIN {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Validation(format!(
            "Rôle inconnu : « {role} ». Valeurs possibles : member, admin."
        ))))
    }
}
