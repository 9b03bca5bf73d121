//! Handlers for the newsletter: public subscription lifecycle and the
//! admin subscriber grid.
//!
//! Subscription is double-opt-in: `subscribe` queues a pending row, the
//! mailer worker sends the confirmation link, and `confirm` flips the
//! status. Status changes always go through the transition rules in
//! `parcours_core::newsletter`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use parcours_core::error::CoreError;
use parcours_core::newsletter::SubscriberStatus;
use parcours_core::types::DbId;
use parcours_db::models::subscriber::SubscriberResponse;
use parcours_db::repositories::subscriber_repo::SubscriberFilter;
use parcours_db::repositories::SubscriberRepo;
use parcours_events::token::hash_confirmation_token;
use parcours_events::PlatformEvent;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::auth::flatten_validation_errors;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /newsletter/subscribe` and `/unsubscribe`.
#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "Adresse e-mail invalide."))]
    pub email: String,
}

/// Query parameters for `GET /newsletter/confirm`.
#[derive(Debug, Deserialize)]
pub struct ConfirmParams {
    pub token: String,
}

/// Query parameters for the admin subscriber grid.
#[derive(Debug, Default, Deserialize)]
pub struct SubscriberListParams {
    pub status: Option<String>,
    pub tag: Option<String>,
    pub q: Option<String>,
}

/// Request body for `POST /admin/subscribers/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Request body for `PUT /admin/subscribers/{id}/tags`.
#[derive(Debug, Deserialize)]
pub struct TagsRequest {
    pub tags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public lifecycle
// ---------------------------------------------------------------------------

/// POST /api/v1/newsletter/subscribe
///
/// Create (or re-arm) a pending subscription. The confirmation email is
/// sent asynchronously by the mailer worker.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(input): Json<EmailRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<SubscriberResponse>>)> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(flatten_validation_errors(&e))))?;

    if let Some(existing) = SubscriberRepo::find_by_email(&state.pool, &input.email).await? {
        let status: SubscriberStatus = existing.status.parse().map_err(AppError::Core)?;
        match status {
            // Already in: idempotent success, no new confirmation cycle.
            SubscriberStatus::Confirmed => {
                return Ok((StatusCode::OK, Json(DataResponse { data: existing.into() })));
            }
            // Suppressed addresses need an admin reset, not a resubscribe.
            SubscriberStatus::Bounced | SubscriberStatus::Complained => {
                return Err(AppError::Core(CoreError::Conflict(
                    "Cette adresse a été désactivée. Contactez le support.".into(),
                )));
            }
            SubscriberStatus::Pending | SubscriberStatus::Unsubscribed => {}
        }
    }

    let subscriber = SubscriberRepo::upsert_pending(&state.pool, &input.email).await?;

    state.event_bus.publish(
        PlatformEvent::new("newsletter.subscribed")
            .with_source("subscriber", subscriber.id),
    );
    tracing::info!(subscriber_id = subscriber.id, "Newsletter subscription requested");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: subscriber.into(),
        }),
    ))
}

/// GET /api/v1/newsletter/confirm?token=...
pub async fn confirm(
    State(state): State<AppState>,
    Query(params): Query<ConfirmParams>,
) -> AppResult<Json<DataResponse<SubscriberResponse>>> {
    let token_hash = hash_confirmation_token(&params.token);

    let subscriber =
        SubscriberRepo::find_by_confirmation_token_hash(&state.pool, &token_hash)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Validation(
                    "Lien de confirmation invalide ou expiré.".into(),
                ))
            })?;

    let current: SubscriberStatus = subscriber.status.parse().map_err(AppError::Core)?;
    current
        .transition(SubscriberStatus::Confirmed)
        .map_err(AppError::Core)?;

    let confirmed = SubscriberRepo::set_status(
        &state.pool,
        subscriber.id,
        SubscriberStatus::Confirmed.as_str(),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Subscriber",
        id: subscriber.id,
    }))?;

    state.event_bus.publish(
        PlatformEvent::new("newsletter.confirmed")
            .with_source("subscriber", confirmed.id),
    );
    tracing::info!(subscriber_id = confirmed.id, "Newsletter subscription confirmed");

    Ok(Json(DataResponse {
        data: confirmed.into(),
    }))
}

/// POST /api/v1/newsletter/unsubscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(input): Json<EmailRequest>,
) -> AppResult<StatusCode> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(flatten_validation_errors(&e))))?;

    // The response does not reveal whether the address was subscribed.
    let Some(subscriber) = SubscriberRepo::find_by_email(&state.pool, &input.email).await? else {
        return Ok(StatusCode::NO_CONTENT);
    };

    let current: SubscriberStatus = subscriber.status.parse().map_err(AppError::Core)?;
    if current == SubscriberStatus::Unsubscribed {
        return Ok(StatusCode::NO_CONTENT);
    }
    if current.can_transition(SubscriberStatus::Unsubscribed) {
        SubscriberRepo::set_status(
            &state.pool,
            subscriber.id,
            SubscriberStatus::Unsubscribed.as_str(),
        )
        .await?;
        state.event_bus.publish(
            PlatformEvent::new("newsletter.unsubscribed")
                .with_source("subscriber", subscriber.id),
        );
        tracing::info!(subscriber_id = subscriber.id, "Newsletter unsubscribed");
    }

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Admin grid
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/subscribers
pub async fn admin_list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<SubscriberListParams>,
) -> AppResult<Json<DataResponse<Vec<SubscriberResponse>>>> {
    if let Some(status) = &params.status {
        status
            .parse::<SubscriberStatus>()
            .map_err(AppError::Core)?;
    }

    let filter = SubscriberFilter {
        status: params.status,
        tag: params.tag,
        query: params.q,
    };
    let subscribers = SubscriberRepo::list(&state.pool, &filter).await?;
    let data = subscribers
        .into_iter()
        .map(SubscriberResponse::from)
        .collect();
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/admin/subscribers/{id}/status
///
/// Admin status transition (mark bounced/complained, reset to pending).
pub async fn admin_set_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(subscriber_id): Path<DbId>,
    Json(input): Json<StatusRequest>,
) -> AppResult<Json<DataResponse<SubscriberResponse>>> {
    let target: SubscriberStatus = input.status.parse().map_err(AppError::Core)?;

    let subscriber = SubscriberRepo::find_by_id(&state.pool, subscriber_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Subscriber",
            id: subscriber_id,
        }))?;

    let current: SubscriberStatus = subscriber.status.parse().map_err(AppError::Core)?;
    current.transition(target).map_err(AppError::Core)?;

    let updated = SubscriberRepo::set_status(&state.pool, subscriber_id, target.as_str())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Subscriber",
            id: subscriber_id,
        }))?;

    state.event_bus.publish(
        PlatformEvent::new("subscriber.status_changed")
            .with_source("subscriber", subscriber_id)
            .with_actor(admin.user_id)
            .with_payload(serde_json::json!({
                "from": current.as_str(),
                "to": target.as_str(),
            })),
    );
    tracing::info!(
        subscriber_id,
        from = current.as_str(),
        to = target.as_str(),
        admin_id = admin.user_id,
        "Subscriber status changed",
    );

    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}

/// PUT /api/v1/admin/subscribers/{id}/tags
pub async fn admin_set_tags(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(subscriber_id): Path<DbId>,
    Json(input): Json<TagsRequest>,
) -> AppResult<Json<DataResponse<SubscriberResponse>>> {
    let mut tags = input.tags;
    tags.iter_mut().for_each(|t| *t = t.trim().to_lowercase());
    tags.retain(|t| !t.is_empty());
    tags.sort();
    tags.dedup();

    let updated = SubscriberRepo::set_tags(
        &state.pool,
        subscriber_id,
        &serde_json::json!(tags),
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Subscriber",
        id: subscriber_id,
    }))?;

    tracing::info!(subscriber_id, admin_id = admin.user_id, "Subscriber tags updated");
    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}
