//! Integration tests for the blog catalogue: slug uniqueness and the
//! category-deletion contract (warn, never cascade).

use parcours_db::models::category::CreateCategory;
use parcours_db::models::post::CreatePost;
use parcours_db::repositories::{CategoryRepo, PostRepo};
use sqlx::PgPool;

fn new_category(name: &str) -> CreateCategory {
    CreateCategory {
        slug: None,
        name: name.to_string(),
        description: String::new(),
    }
}

fn new_post(title: &str, category_id: Option<i64>) -> CreatePost {
    CreatePost {
        slug: None,
        title: title.to_string(),
        summary: String::new(),
        body: String::new(),
        category_id,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_slugs_are_rejected(pool: PgPool) {
    CategoryRepo::create(&pool, "sommeil", &new_category("Sommeil"))
        .await
        .unwrap();

    let err = CategoryRepo::create(&pool, "sommeil", &new_category("Sommeil bis"))
        .await
        .expect_err("duplicate category slug must fail");
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.constraint(), Some("uq_categories_slug"));
        }
        other => panic!("expected a database error, got {other:?}"),
    }

    PostRepo::create(&pool, "bien-dormir", &new_post("Bien dormir", None))
        .await
        .unwrap();
    let err = PostRepo::create(&pool, "bien-dormir", &new_post("Doublon", None))
        .await
        .expect_err("duplicate post slug must fail");
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.constraint(), Some("uq_posts_slug"));
        }
        other => panic!("expected a database error, got {other:?}"),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn deleting_a_category_orphans_posts_without_cascade(pool: PgPool) {
    let category = CategoryRepo::create(&pool, "sommeil", &new_category("Sommeil"))
        .await
        .unwrap();
    let post = PostRepo::create(&pool, "bien-dormir", &new_post("Bien dormir", Some(category.id)))
        .await
        .unwrap();

    // Dry-run preview sees the dependent post.
    assert_eq!(
        CategoryRepo::count_live_posts(&pool, category.id)
            .await
            .unwrap(),
        1
    );

    assert!(CategoryRepo::delete(&pool, category.id).await.unwrap());

    // The post survives, uncategorized, awaiting manual re-categorization.
    let orphaned = PostRepo::find_by_id(&pool, post.id).await.unwrap().unwrap();
    assert_eq!(orphaned.category_id, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn soft_deleted_posts_do_not_count_toward_the_preview(pool: PgPool) {
    let category = CategoryRepo::create(&pool, "sommeil", &new_category("Sommeil"))
        .await
        .unwrap();
    let post = PostRepo::create(&pool, "bien-dormir", &new_post("Bien dormir", Some(category.id)))
        .await
        .unwrap();

    PostRepo::soft_delete(&pool, post.id).await.unwrap();
    assert_eq!(
        CategoryRepo::count_live_posts(&pool, category.id)
            .await
            .unwrap(),
        0
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn category_list_carries_live_post_counts(pool: PgPool) {
    let sommeil = CategoryRepo::create(&pool, "sommeil", &new_category("Sommeil"))
        .await
        .unwrap();
    CategoryRepo::create(&pool, "stress", &new_category("Stress"))
        .await
        .unwrap();

    PostRepo::create(&pool, "p1", &new_post("P1", Some(sommeil.id)))
        .await
        .unwrap();
    PostRepo::create(&pool, "p2", &new_post("P2", Some(sommeil.id)))
        .await
        .unwrap();

    let listed = CategoryRepo::list_with_counts(&pool).await.unwrap();
    let by_slug: Vec<_> = listed.iter().map(|c| (c.slug.as_str(), c.post_count)).collect();
    assert_eq!(by_slug, vec![("sommeil", 2), ("stress", 0)]);
}
