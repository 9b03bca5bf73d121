//! HTTP-level integration tests for the program runner: day views, the
//! debounced draft cache, legacy key migration, day completion, and
//! progress aggregation.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_json, put_json, seed_member};
use parcours_db::models::program::CreateProgram;
use parcours_db::repositories::{DraftEntryRepo, ProgramRepo, UserRepo};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A two-day curriculum around the breathing exercise from the runner.
fn curriculum() -> serde_json::Value {
    json!([
        {
            "day": 3,
            "title": "Respiration",
            "sections": [{
                "slot": "morning",
                "exercises": [{
                    "key": "breathing",
                    "title": "Cohérence cardiaque",
                    "fields": [
                        {"key": "duration", "label": "Durée (min)", "type": "number"},
                        {"key": "mood", "label": "Humeur", "type": "slider", "min": 0, "max": 10}
                    ]
                }]
            }]
        },
        {
            "day": 4,
            "title": "Marche",
            "sections": []
        }
    ])
}

/// Seed a published program carrying the test curriculum.
async fn seed_published_program(pool: &PgPool, slug: &str) -> i64 {
    let program = ProgramRepo::create(
        pool,
        slug,
        &CreateProgram {
            slug: Some(slug.to_string()),
            title: "Reset".to_string(),
            summary: "Une semaine pour souffler.".to_string(),
            price_cents: 4900,
            currency: None,
            hero: None,
            benefits: None,
            faq: None,
            seo: None,
            days: Some(curriculum()),
        },
    )
    .await
    .unwrap();
    ProgramRepo::set_status(pool, program.id, "published")
        .await
        .unwrap();
    program.id
}

// ---------------------------------------------------------------------------
// Draft cache over HTTP
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn draft_round_trip_and_day_independence(pool: PgPool) {
    seed_published_program(&pool, "reset-7").await;
    let app = build_test_app(pool);

    // Record a value anonymously (preview access).
    let response = put_json(
        app.clone(),
        "/api/v1/programs/reset-7/days/3/draft/values",
        None,
        json!({"path": "ex.breathing.duration", "value": 8}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["save_state"], "saving");

    // The draft is readable immediately (pending edits win over storage).
    let response = get(app.clone(), "/api/v1/programs/reset-7/days/3/draft", None).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["ex.breathing.duration"], 8);

    // Day 4 is untouched; going back to day 3 still shows the value.
    let response = get(app.clone(), "/api/v1/programs/reset-7/days/4/draft", None).await;
    assert_eq!(body_json(response).await["data"], json!({}));
    let response = get(app.clone(), "/api/v1/programs/reset-7/days/3/draft", None).await;
    assert_eq!(body_json(response).await["data"]["ex.breathing.duration"], 8);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn draft_persists_after_the_debounce_window(pool: PgPool) {
    seed_published_program(&pool, "reset-7").await;

    let app = build_test_app(pool.clone());
    put_json(
        app.clone(),
        "/api/v1/programs/reset-7/days/3/draft/values",
        None,
        json!({"path": "ex.breathing.duration", "value": 8}),
    )
    .await;

    // Wait out the debounce, then read through a *fresh* app instance so
    // the value must come from storage, not the in-memory pending map.
    tokio::time::sleep(Duration::from_millis(1200)).await;

    let fresh = build_test_app(pool);
    let response = get(fresh.clone(), "/api/v1/programs/reset-7/days/3/draft", None).await;
    assert_eq!(body_json(response).await["data"]["ex.breathing.duration"], 8);

    // Saving also recorded the last visited day.
    let response = get(fresh, "/api/v1/programs/reset-7/last-day", None).await;
    assert_eq!(body_json(response).await["data"]["last_day"], 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn legacy_draft_key_is_migrated_on_first_load(pool: PgPool) {
    seed_published_program(&pool, "reset-7").await;

    // Pre-seed a draft under the legacy unscoped key format.
    DraftEntryRepo::put(
        &pool,
        "draft:reset-7:day:3",
        r#"{"ex.breathing.duration":8}"#,
    )
    .await
    .unwrap();

    let app = build_test_app(pool.clone());
    let response = get(app, "/api/v1/programs/reset-7/days/3/draft", None).await;
    assert_eq!(body_json(response).await["data"]["ex.breathing.duration"], 8);

    // Migrated exactly once: the legacy key is gone, the scoped key holds
    // the payload.
    assert_eq!(
        DraftEntryRepo::get(&pool, "draft:reset-7:day:3").await.unwrap(),
        None
    );
    assert!(DraftEntryRepo::get(&pool, "draft:v2:anon:reset-7:day:3")
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn draft_values_are_validated_per_field_kind(pool: PgPool) {
    seed_published_program(&pool, "reset-7").await;
    let app = build_test_app(pool);

    // Unknown field paths are rejected.
    let response = put_json(
        app.clone(),
        "/api/v1/programs/reset-7/days/3/draft/values",
        None,
        json!({"path": "ex.breathing.inconnu", "value": 1}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Slider values are clamped into [min, max] instead of rejected.
    put_json(
        app.clone(),
        "/api/v1/programs/reset-7/days/3/draft/values",
        None,
        json!({"path": "ex.breathing.mood", "value": 42}),
    )
    .await;
    let response = get(app, "/api/v1/programs/reset-7/days/3/draft", None).await;
    assert_eq!(body_json(response).await["data"]["ex.breathing.mood"], 10);
}

// ---------------------------------------------------------------------------
// Authoritative day state
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn completing_a_day_requires_an_enrollment(pool: PgPool) {
    seed_published_program(&pool, "reset-7").await;
    let (_member, token) = seed_member(&pool).await;
    let app = build_test_app(pool);

    let response = put_json(
        app.clone(),
        "/api/v1/programs/reset-7/days/3/complete",
        Some(&token),
        json!({"answers": {}, "completed": true}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Enroll, then complete.
    let response = post_json(
        app.clone(),
        "/api/v1/programs/reset-7/enroll",
        Some(&token),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = put_json(
        app.clone(),
        "/api/v1/programs/reset-7/days/3/complete",
        Some(&token),
        json!({
            "answers": {"ex.breathing.duration": 8},
            "slider_before": 3,
            "slider_after": 99,
            "completed": true,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["completed"], true);
    // Session sliders are clamped to [0, 10].
    assert_eq!(body["data"]["slider_after"], 10);

    let response = get(app, "/api/v1/programs/reset-7/progress", Some(&token)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["completed_count"], 1);
    assert_eq!(body["data"]["day_count"], 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn completion_rejects_unknown_answer_paths(pool: PgPool) {
    seed_published_program(&pool, "reset-7").await;
    let (_member, token) = seed_member(&pool).await;
    let app = build_test_app(pool);

    post_json(
        app.clone(),
        "/api/v1/programs/reset-7/enroll",
        Some(&token),
        json!({}),
    )
    .await;

    let response = put_json(
        app,
        "/api/v1/programs/reset-7/days/3/complete",
        Some(&token),
        json!({"answers": {"ex.autre.champ": 1}, "completed": false}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Enrollment limits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn enrollment_respects_the_concurrent_program_limit(pool: PgPool) {
    seed_published_program(&pool, "reset-7").await;
    seed_published_program(&pool, "sommeil-21").await;
    let (member, token) = seed_member(&pool).await;
    UserRepo::set_limits(&pool, member.id, 1).await.unwrap();

    let app = build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/programs/reset-7/enroll",
        Some(&token),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Enrolling twice in the same program conflicts.
    let response = post_json(
        app.clone(),
        "/api/v1/programs/reset-7/enroll",
        Some(&token),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // A second active program exceeds the limit of 1.
    let response = post_json(
        app,
        "/api/v1/programs/sommeil-21/enroll",
        Some(&token),
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("maximal"));
}
