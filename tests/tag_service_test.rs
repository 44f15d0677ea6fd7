//! Service-level tests against a real PostgreSQL database
//!
//! Covers the behavior that only the SQL can prove: idempotent tag attach,
//! detach of an unattached tag, and the check-then-act ownership gate on
//! book, review, and tag mutations (a denied write must leave the row
//! untouched).
//!
//! These need a PostgreSQL instance reachable through `DATABASE_URL`; the
//! sqlx harness creates a throwaway database per test and applies the
//! migrations. Run with `cargo test -- --ignored`.

use catalog_service::error::AppError;
use catalog_service::models::{Book, User};
use catalog_service::services::{
    BookPatch, BookService, NewBook, NewReview, ReviewPatch, ReviewService, TagService,
    UserService,
};
use sqlx::PgPool;

async fn make_user(pool: &PgPool, email: &str) -> User {
    UserService::new(pool.clone())
        .create_user("reader", email, "a-fine-password")
        .await
        .expect("create user")
}

async fn make_book(pool: &PgPool, owner: &User) -> Book {
    BookService::new(pool.clone())
        .create_book(
            NewBook {
                title: "The Master and Margarita".to_string(),
                author: "Mikhail Bulgakov".to_string(),
                publisher: "YMCA Press".to_string(),
                published_date: "1967-01-01".to_string(),
                page_count: 384,
                language: "ru".to_string(),
            },
            owner.uid,
        )
        .await
        .expect("create book")
}

#[sqlx::test]
#[ignore]
async fn double_attach_leaves_tag_set_unchanged(pool: PgPool) {
    let owner = make_user(&pool, "owner@example.com").await;
    let book = make_book(&pool, &owner).await;
    let tags = TagService::new(pool.clone());

    let names = ["fiction".to_string(), "classic".to_string()];
    let (_, first) = tags
        .add_tags_to_book(book.uid, &names, owner.uid)
        .await
        .expect("first attach");
    assert_eq!(first.len(), 2);

    // Re-attaching one of the names is a silent no-op
    let (_, second) = tags
        .add_tags_to_book(book.uid, &["fiction".to_string()], owner.uid)
        .await
        .expect("second attach");
    assert_eq!(second.len(), 2);

    // And no duplicate tag row was minted for the existing name
    let fiction_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE name = $1")
        .bind("fiction")
        .fetch_one(&pool)
        .await
        .expect("count tags");
    assert_eq!(fiction_rows, 1);
}

#[sqlx::test]
#[ignore]
async fn tag_names_match_case_sensitively(pool: PgPool) {
    let owner = make_user(&pool, "owner@example.com").await;
    let book = make_book(&pool, &owner).await;
    let tags = TagService::new(pool.clone());

    let names = ["Fiction".to_string(), "fiction".to_string()];
    let (_, attached) = tags
        .add_tags_to_book(book.uid, &names, owner.uid)
        .await
        .expect("attach");

    // Two distinct tags; no normalization
    assert_eq!(attached.len(), 2);
}

#[sqlx::test]
#[ignore]
async fn detaching_an_unattached_tag_is_not_found(pool: PgPool) {
    let owner = make_user(&pool, "owner@example.com").await;
    let book = make_book(&pool, &owner).await;
    let other_book = make_book(&pool, &owner).await;
    let tags = TagService::new(pool.clone());

    // The tag exists, but only on the other book
    let (_, attached) = tags
        .add_tags_to_book(other_book.uid, &["fiction".to_string()], owner.uid)
        .await
        .expect("attach");
    let tag_uid = attached[0].uid;

    let err = tags
        .remove_tag_from_book(book.uid, tag_uid, owner.uid)
        .await
        .expect_err("detach of unattached tag must fail");
    assert!(matches!(err, AppError::NotFound(_)));

    // The link on the other book survived
    let still_there = tags
        .list_tags_for_book(other_book.uid)
        .await
        .expect("list tags");
    assert_eq!(still_there.len(), 1);
}

#[sqlx::test]
#[ignore]
async fn non_owner_attach_is_forbidden_and_writes_nothing(pool: PgPool) {
    let owner = make_user(&pool, "owner@example.com").await;
    let intruder = make_user(&pool, "intruder@example.com").await;
    let book = make_book(&pool, &owner).await;
    let tags = TagService::new(pool.clone());

    let err = tags
        .add_tags_to_book(book.uid, &["fiction".to_string()], intruder.uid)
        .await
        .expect_err("non-owner attach must fail");
    assert!(matches!(err, AppError::Forbidden(_)));

    assert!(tags
        .list_tags_for_book(book.uid)
        .await
        .expect("list tags")
        .is_empty());
    let tag_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags")
        .fetch_one(&pool)
        .await
        .expect("count tags");
    assert_eq!(tag_rows, 0);
}

#[sqlx::test]
#[ignore]
async fn non_owner_book_update_leaves_row_unchanged(pool: PgPool) {
    let owner = make_user(&pool, "owner@example.com").await;
    let intruder = make_user(&pool, "intruder@example.com").await;
    let book = make_book(&pool, &owner).await;
    let books = BookService::new(pool.clone());

    let patch = BookPatch {
        title: Some("Defaced".to_string()),
        ..BookPatch::default()
    };
    let err = books
        .update_book(book.uid, patch, intruder.uid)
        .await
        .expect_err("non-owner update must fail");
    assert!(matches!(err, AppError::Forbidden(_)));

    let unchanged = books.get_book(book.uid).await.expect("book still there");
    assert_eq!(unchanged.title, book.title);
    assert_eq!(unchanged.updated_at, book.updated_at);
}

#[sqlx::test]
#[ignore]
async fn non_owner_book_delete_leaves_row_in_place(pool: PgPool) {
    let owner = make_user(&pool, "owner@example.com").await;
    let intruder = make_user(&pool, "intruder@example.com").await;
    let book = make_book(&pool, &owner).await;
    let books = BookService::new(pool.clone());

    let err = books
        .delete_book(book.uid, intruder.uid)
        .await
        .expect_err("non-owner delete must fail");
    assert!(matches!(err, AppError::Forbidden(_)));

    assert!(books.get_book(book.uid).await.is_ok());
}

#[sqlx::test]
#[ignore]
async fn non_owner_review_mutations_are_forbidden(pool: PgPool) {
    let owner = make_user(&pool, "owner@example.com").await;
    let intruder = make_user(&pool, "intruder@example.com").await;
    let book = make_book(&pool, &owner).await;
    let reviews = ReviewService::new(pool.clone());

    let review = reviews
        .add_review(
            book.uid,
            owner.uid,
            NewReview {
                content: "A devil in Moscow".to_string(),
                rating: 5,
            },
        )
        .await
        .expect("create review");

    let patch = ReviewPatch {
        content: Some("Defaced".to_string()),
        rating: None,
    };
    let err = reviews
        .update_review(review.uid, patch, intruder.uid)
        .await
        .expect_err("non-owner review update must fail");
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = reviews
        .delete_review(review.uid, intruder.uid)
        .await
        .expect_err("non-owner review delete must fail");
    assert!(matches!(err, AppError::Forbidden(_)));

    // Row untouched by either attempt
    let rows = reviews
        .list_by_user(owner.uid)
        .await
        .expect("list reviews");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].content, "A devil in Moscow");
}

#[sqlx::test]
#[ignore]
async fn review_under_missing_book_is_not_found(pool: PgPool) {
    let owner = make_user(&pool, "owner@example.com").await;
    let reviews = ReviewService::new(pool.clone());

    let err = reviews
        .add_review(
            uuid::Uuid::new_v4(),
            owner.uid,
            NewReview {
                content: "orphan".to_string(),
                rating: 3,
            },
        )
        .await
        .expect_err("review under missing book must fail");
    assert!(matches!(err, AppError::NotFound(_)));
}
