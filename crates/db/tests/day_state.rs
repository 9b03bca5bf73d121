//! Integration tests for day-state upserts, progress, and export filtering.

use parcours_db::models::day_state::UpsertDayState;
use parcours_db::models::program::CreateProgram;
use parcours_db::models::user::CreateUser;
use parcours_db::repositories::day_state_repo::DayStateExportFilter;
use parcours_db::repositories::{DayStateRepo, ProgramRepo, UserRepo};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, email: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            display_name: "Membre".to_string(),
            password_hash: "$argon2id$fake".to_string(),
            role: "member".to_string(),
            marketing_opt_in: false,
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_program(pool: &PgPool, slug: &str) -> i64 {
    ProgramRepo::create(
        pool,
        slug,
        &CreateProgram {
            slug: Some(slug.to_string()),
            title: "Programme".to_string(),
            summary: String::new(),
            price_cents: 4900,
            currency: None,
            hero: None,
            benefits: None,
            faq: None,
            seo: None,
            days: None,
        },
    )
    .await
    .unwrap()
    .id
}

fn answers_only(answers: serde_json::Value) -> UpsertDayState {
    UpsertDayState {
        answers,
        slider_before: None,
        slider_after: None,
        completed: false,
    }
}

// ---------------------------------------------------------------------------
// Upsert semantics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn upsert_replaces_answers_for_the_same_day(pool: PgPool) {
    let user_id = seed_user(&pool, "u1@example.com").await;
    let program_id = seed_program(&pool, "reset-7").await;

    let first = DayStateRepo::upsert(
        &pool,
        user_id,
        program_id,
        3,
        &answers_only(json!({"ex.breathing.duration": 8})),
    )
    .await
    .unwrap();

    let second = DayStateRepo::upsert(
        &pool,
        user_id,
        program_id,
        3,
        &answers_only(json!({"ex.breathing.duration": 12})),
    )
    .await
    .unwrap();

    // Same row, updated in place.
    assert_eq!(first.id, second.id);
    assert_eq!(second.answers, json!({"ex.breathing.duration": 12}));

    let found = DayStateRepo::find(&pool, user_id, program_id, 3)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.answers, json!({"ex.breathing.duration": 12}));
}

#[sqlx::test(migrations = "./migrations")]
async fn completion_timestamp_is_stamped_once(pool: PgPool) {
    let user_id = seed_user(&pool, "u1@example.com").await;
    let program_id = seed_program(&pool, "reset-7").await;

    let done = DayStateRepo::upsert(
        &pool,
        user_id,
        program_id,
        1,
        &UpsertDayState {
            answers: json!({}),
            slider_before: Some(3),
            slider_after: Some(7),
            completed: true,
        },
    )
    .await
    .unwrap();
    assert!(done.completed);
    let first_completed_at = done.completed_at.expect("completed_at must be set");

    // Re-upserting a completed day keeps the original completion time.
    let again = DayStateRepo::upsert(
        &pool,
        user_id,
        program_id,
        1,
        &UpsertDayState {
            answers: json!({"ex.review.note": "ok"}),
            slider_before: Some(3),
            slider_after: Some(8),
            completed: true,
        },
    )
    .await
    .unwrap();
    assert_eq!(again.completed_at, Some(first_completed_at));
}

#[sqlx::test(migrations = "./migrations")]
async fn days_are_rows_of_their_own(pool: PgPool) {
    let user_id = seed_user(&pool, "u1@example.com").await;
    let program_id = seed_program(&pool, "reset-7").await;

    DayStateRepo::upsert(
        &pool,
        user_id,
        program_id,
        3,
        &answers_only(json!({"ex.breathing.duration": 8})),
    )
    .await
    .unwrap();

    assert!(DayStateRepo::find(&pool, user_id, program_id, 4)
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Progress aggregation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn progress_lists_days_in_order(pool: PgPool) {
    let user_id = seed_user(&pool, "u1@example.com").await;
    let program_id = seed_program(&pool, "reset-7").await;

    for (day, completed) in [(2, true), (1, true), (3, false)] {
        DayStateRepo::upsert(
            &pool,
            user_id,
            program_id,
            day,
            &UpsertDayState {
                answers: json!({}),
                slider_before: None,
                slider_after: None,
                completed,
            },
        )
        .await
        .unwrap();
    }

    let progress = DayStateRepo::progress(&pool, user_id, program_id)
        .await
        .unwrap();
    let days: Vec<_> = progress.iter().map(|p| (p.day, p.completed)).collect();
    assert_eq!(days, vec![(1, true), (2, true), (3, false)]);
}

// ---------------------------------------------------------------------------
// Export filters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn export_filters_by_program_slug(pool: PgPool) {
    let user_id = seed_user(&pool, "u1@example.com").await;
    let reset = seed_program(&pool, "reset-7").await;
    let sommeil = seed_program(&pool, "sommeil-21").await;

    DayStateRepo::upsert(&pool, user_id, reset, 1, &answers_only(json!({})))
        .await
        .unwrap();
    DayStateRepo::upsert(&pool, user_id, sommeil, 1, &answers_only(json!({})))
        .await
        .unwrap();

    let all = DayStateRepo::export(&pool, &DayStateExportFilter::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let only_reset = DayStateRepo::export(
        &pool,
        &DayStateExportFilter {
            program_slug: Some("reset-7".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(only_reset.len(), 1);
    assert_eq!(only_reset[0].program_slug, "reset-7");
    assert_eq!(only_reset[0].user_email, "u1@example.com");
}
