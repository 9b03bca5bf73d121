//! Integration tests for enrollments: pair uniqueness, active counts, and
//! status transitions.

use parcours_db::models::program::CreateProgram;
use parcours_db::models::user::CreateUser;
use parcours_db::repositories::{EnrollmentRepo, ProgramRepo, UserRepo};
use sqlx::PgPool;

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
            title: slug.to_string(),
            summary: String::new(),
            price_cents: 0,
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

#[sqlx::test(migrations = "./migrations")]
async fn one_enrollment_per_user_program_pair(pool: PgPool) {
    let user_id = seed_user(&pool, "u1@example.com").await;
    let program_id = seed_program(&pool, "reset-7").await;

    EnrollmentRepo::create(&pool, user_id, program_id)
        .await
        .unwrap();

    let duplicate = EnrollmentRepo::create(&pool, user_id, program_id).await;
    let err = duplicate.expect_err("second enrollment for the same pair must fail");

    // The unique constraint is named with the uq_ prefix so the API layer
    // maps it to 409.
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.constraint(), Some("uq_enrollments_user_program"));
        }
        other => panic!("expected a database error, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn active_count_tracks_only_active_enrollments(pool: PgPool) {
    let user_id = seed_user(&pool, "u1@example.com").await;
    let a = seed_program(&pool, "reset-7").await;
    let b = seed_program(&pool, "sommeil-21").await;

    let first = EnrollmentRepo::create(&pool, user_id, a).await.unwrap();
    EnrollmentRepo::create(&pool, user_id, b).await.unwrap();
    assert_eq!(
        EnrollmentRepo::count_active_for_user(&pool, user_id)
            .await
            .unwrap(),
        2
    );

    EnrollmentRepo::set_status(&pool, first.id, "paused")
        .await
        .unwrap();
    assert_eq!(
        EnrollmentRepo::count_active_for_user(&pool, user_id)
            .await
            .unwrap(),
        1
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn completing_stamps_completed_at_once(pool: PgPool) {
    let user_id = seed_user(&pool, "u1@example.com").await;
    let program_id = seed_program(&pool, "reset-7").await;

    let enrollment = EnrollmentRepo::create(&pool, user_id, program_id)
        .await
        .unwrap();
    assert_eq!(enrollment.status, "active");
    assert_eq!(enrollment.current_day, 1);

    let done = EnrollmentRepo::set_status(&pool, enrollment.id, "completed")
        .await
        .unwrap()
        .unwrap();
    let completed_at = done.completed_at.expect("completed_at must be set");

    // Pausing and completing again keeps the original completion time.
    EnrollmentRepo::set_status(&pool, enrollment.id, "paused")
        .await
        .unwrap();
    let again = EnrollmentRepo::set_status(&pool, enrollment.id, "completed")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(again.completed_at, Some(completed_at));
}

#[sqlx::test(migrations = "./migrations")]
async fn current_day_navigation_is_persisted(pool: PgPool) {
    let user_id = seed_user(&pool, "u1@example.com").await;
    let program_id = seed_program(&pool, "reset-7").await;

    let enrollment = EnrollmentRepo::create(&pool, user_id, program_id)
        .await
        .unwrap();

    let moved = EnrollmentRepo::set_current_day(&pool, enrollment.id, 4)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.current_day, 4);

    let listed = EnrollmentRepo::list_for_user(&pool, user_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].current_day, 4);
    assert_eq!(listed[0].program_slug, "reset-7");
}
