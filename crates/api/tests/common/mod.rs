//! Shared helpers for HTTP-level integration tests.
//!
//! Mirrors the router construction in `main.rs` so integration tests
//! exercise the same middleware stack (CORS, request ID, timeout, tracing,
//! panic recovery) that production uses.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use parcours_api::auth::jwt::{generate_access_token, JwtConfig};
use parcours_api::config::ServerConfig;
use parcours_api::routes;
use parcours_api::state::AppState;
use parcours_api::storage::PgDraftStorage;
use parcours_core::draft::DraftCache;
use parcours_db::models::user::{CreateUser, User};
use parcours_db::repositories::UserRepo;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let draft_cache = DraftCache::new(Arc::new(PgDraftStorage::new(pool.clone())));

    let state = AppState {
        pool,
        config: Arc::new(config),
        event_bus: Arc::new(parcours_events::EventBus::default()),
        draft_cache,
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a request and return the raw response.
async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should not fail")
}

fn with_auth(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(t) => builder.header(AUTHORIZATION, format!("Bearer {t}")),
        None => builder,
    }
}

pub async fn get(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    let request = with_auth(Request::builder().method(Method::GET).uri(uri), token)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str, token: Option<&str>) -> Response<Body> {
    let request = with_auth(Request::builder().method(Method::DELETE).uri(uri), token)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let request = with_auth(Request::builder().method(Method::POST).uri(uri), token)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let request = with_auth(Request::builder().method(Method::PUT).uri(uri), token)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Collect a response body into parsed JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Create a user row directly and mint an access token for it.
pub async fn seed_user_with_token(pool: &PgPool, email: &str, role: &str) -> (User, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            display_name: "Test".to_string(),
            // Never verified in these tests; a real PHC string is not needed.
            password_hash: "$argon2id$test-only".to_string(),
            role: role.to_string(),
            marketing_opt_in: false,
        },
    )
    .await
    .expect("seed user");

    let token = generate_access_token(user.id, role, &test_config().jwt).expect("token");
    (user, token)
}

pub async fn seed_admin(pool: &PgPool) -> (User, String) {
    seed_user_with_token(pool, "admin@example.com", "admin").await
}

pub async fn seed_member(pool: &PgPool) -> (User, String) {
    seed_user_with_token(pool, "member@example.com", "member").await
}
