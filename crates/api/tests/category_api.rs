//! HTTP-level integration tests for category administration, in particular
//! the delete dry-run preview and the warn-without-cascade delete.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, delete, get, post_json, seed_admin, seed_member};
use parcours_db::repositories::PostRepo;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn create_category_and_preview_empty_delete(pool: PgPool) {
    let (_admin, token) = seed_admin(&pool).await;

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/admin/categories",
        Some(&token),
        json!({"name": "Sommeil"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let category_id = body["data"]["id"].as_i64().unwrap();
    // The slug is derived from the name when omitted.
    assert_eq!(body["data"]["slug"], "sommeil");

    let response = get(
        build_test_app(pool),
        &format!("/api/v1/admin/categories/{category_id}/delete-preview"),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["post_count"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_preview_counts_posts_and_delete_orphans_them(pool: PgPool) {
    let (_admin, token) = seed_admin(&pool).await;

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/admin/categories",
        Some(&token),
        json!({"name": "Sommeil"}),
    )
    .await;
    let category_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    // Two posts in the category.
    for slug in ["bien-dormir", "mieux-dormir"] {
        let response = post_json(
            build_test_app(pool.clone()),
            "/api/v1/admin/posts",
            Some(&token),
            json!({"title": slug, "slug": slug, "category_id": category_id}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Dry run: the preview warns about manual re-categorization.
    let response = get(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/categories/{category_id}/delete-preview"),
        Some(&token),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["post_count"], 2);
    assert!(body["data"]["warning"]
        .as_str()
        .unwrap()
        .contains("re-catégorisés manuellement"));

    // Real delete: no cascade, the posts survive uncategorized.
    let response = delete(
        build_test_app(pool.clone()),
        &format!("/api/v1/admin/categories/{category_id}"),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let posts = PostRepo::list(&pool, false).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|p| p.category_id.is_none()));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn category_mutations_require_admin(pool: PgPool) {
    let (_member, token) = seed_member(&pool).await;

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/admin/categories",
        Some(&token),
        json!({"name": "Stress"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The public list stays open.
    let response = get(build_test_app(pool), "/api/v1/categories", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}
