//! HTTP-level integration tests for the `/auth` endpoints and the RBAC
//! gate on admin routes.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_json, seed_admin, seed_member};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn register_then_login(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/register",
        None,
        json!({
            "email": "claire@example.com",
            "display_name": "Claire",
            "password": "un-mot-de-passe-solide",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert!(body["access_token"].as_str().is_some());
    assert!(body["refresh_token"].as_str().is_some());
    assert_eq!(body["user"]["email"], "claire@example.com");
    assert_eq!(body["user"]["role"], "member");

    // Login with the same credentials.
    let app = build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/login",
        None,
        json!({
            "email": "claire@example.com",
            "password": "un-mot-de-passe-solide",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_duplicate_email(pool: PgPool) {
    let payload = json!({
        "email": "claire@example.com",
        "display_name": "Claire",
        "password": "un-mot-de-passe-solide",
    });

    let response = post_json(build_test_app(pool.clone()), "/api/v1/auth/register", None, payload.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(build_test_app(pool), "/api/v1/auth/register", None, payload).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_invalid_email_and_short_password(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/register",
        None,
        json!({"email": "pas-un-email", "display_name": "X", "password": "assez-long-oui"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/register",
        None,
        json!({"email": "ok@example.com", "display_name": "X", "password": "court"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_with_wrong_password_is_unauthorized(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/register",
        None,
        json!({
            "email": "claire@example.com",
            "display_name": "Claire",
            "password": "un-mot-de-passe-solide",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/login",
        None,
        json!({"email": "claire@example.com", "password": "mauvais"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_routes_reject_members_and_anonymous(pool: PgPool) {
    let (_member, member_token) = seed_member(&pool).await;

    let response = get(build_test_app(pool.clone()), "/api/v1/admin/users", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get(
        build_test_app(pool.clone()),
        "/api/v1/admin/users",
        Some(&member_token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (_admin, admin_token) = seed_admin(&pool).await;
    let response = get(build_test_app(pool), "/api/v1/admin/users", Some(&admin_token)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn suspended_accounts_cannot_log_in(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/auth/register",
        None,
        json!({
            "email": "claire@example.com",
            "display_name": "Claire",
            "password": "un-mot-de-passe-solide",
        }),
    )
    .await;
    let body = body_json(response).await;
    let user_id = body["user"]["id"].as_i64().unwrap();

    parcours_db::repositories::UserRepo::suspend(&pool, user_id)
        .await
        .unwrap();

    let response = post_json(
        build_test_app(pool),
        "/api/v1/auth/login",
        None,
        json!({"email": "claire@example.com", "password": "un-mot-de-passe-solide"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
