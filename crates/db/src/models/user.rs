//! User entity model and DTOs.

use parcours_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub theme: String,
    pub marketing_opt_in: bool,
    pub max_active_programs: i32,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub suspended_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

impl User {
    pub fn is_suspended(&self) -> bool {
        self.suspended_at.is_some()
    }

    pub fn is_archived(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub theme: String,
    pub marketing_opt_in: bool,
    pub max_active_programs: i32,
    pub suspended_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        UserResponse {
            id: u.id,
            email: u.email,
            display_name: u.display_name,
            role: u.role,
            theme: u.theme,
            marketing_opt_in: u.marketing_opt_in,
            max_active_programs: u.max_active_programs,
            suspended_at: u.suspended_at,
            deleted_at: u.deleted_at,
            last_login_at: u.last_login_at,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// DTO for creating a new user (registration or admin create).
#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub marketing_opt_in: bool,
}

/// DTO for updating a user's profile. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub display_name: Option<String>,
    pub theme: Option<String>,
    pub marketing_opt_in: Option<bool>,
}
