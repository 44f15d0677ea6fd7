/// Review service - reviews live under a parent book and belong to their
/// author; updates and deletes are owner-only.
use crate::error::{AppError, Result};
use crate::models::Review;
use crate::policy::ensure_owner;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const REVIEW_COLUMNS: &str = "uid, user_uid, book_uid, content, rating, created_at, updated_at";

#[derive(Debug, Deserialize, Validate)]
pub struct NewReview {
    pub content: String,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReviewPatch {
    pub content: Option<String>,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: Option<i32>,
}

pub struct ReviewService {
    pool: PgPool,
}

impl ReviewService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_user(&self, user_uid: Uuid) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE user_uid = $1 ORDER BY created_at DESC",
            REVIEW_COLUMNS
        ))
        .bind(user_uid)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn get_review(&self, review_uid: Uuid) -> Result<Review> {
        sqlx::query_as::<_, Review>(&format!(
            "SELECT {} FROM reviews WHERE uid = $1",
            REVIEW_COLUMNS
        ))
        .bind(review_uid)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))
    }

    /// Add a review under an existing book, owned by the acting user.
    pub async fn add_review(
        &self,
        book_uid: Uuid,
        user_uid: Uuid,
        data: NewReview,
    ) -> Result<Review> {
        let book_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE uid = $1)")
            .bind(book_uid)
            .fetch_one(&self.pool)
            .await?;

        if !book_exists {
            return Err(AppError::NotFound("Book not found".to_string()));
        }

        let review = sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews (user_uid, book_uid, content, rating)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(user_uid)
        .bind(book_uid)
        .bind(&data.content)
        .bind(data.rating)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(uid = %review.uid, book = %book_uid, "Review created");
        Ok(review)
    }

    pub async fn update_review(
        &self,
        review_uid: Uuid,
        patch: ReviewPatch,
        acting_uid: Uuid,
    ) -> Result<Review> {
        let review = self.get_review(review_uid).await?;
        ensure_owner(review.user_uid, acting_uid)?;

        let updated = sqlx::query_as::<_, Review>(&format!(
            r#"
            UPDATE reviews
            SET content = COALESCE($2, content),
                rating = COALESCE($3, rating),
                updated_at = NOW()
            WHERE uid = $1
            RETURNING {}
            "#,
            REVIEW_COLUMNS
        ))
        .bind(review_uid)
        .bind(patch.content)
        .bind(patch.rating)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn delete_review(&self, review_uid: Uuid, acting_uid: Uuid) -> Result<()> {
        let review = self.get_review(review_uid).await?;
        ensure_owner(review.user_uid, acting_uid)?;

        sqlx::query("DELETE FROM reviews WHERE uid = $1")
            .bind(review_uid)
            .execute(&self.pool)
            .await?;

        tracing::info!(uid = %review_uid, "Review deleted");
        Ok(())
    }
}
