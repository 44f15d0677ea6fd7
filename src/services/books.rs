/// Book service - catalog CRUD with ownership enforcement
use crate::error::{AppError, Result};
use crate::models::{Book, Review};
use crate::policy::ensure_owner;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

const BOOK_COLUMNS: &str = "uid, user_uid, title, author, publisher, published_date, page_count, \
                            language, created_at, updated_at";

/// Input for creating a book.
#[derive(Debug, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub published_date: String,
    pub page_count: i32,
    pub language: String,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub page_count: Option<i32>,
    pub language: Option<String>,
}

pub struct BookService {
    pool: PgPool,
}

impl BookService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books ORDER BY created_at DESC",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    pub async fn list_by_user(&self, user_uid: Uuid) -> Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE user_uid = $1 ORDER BY created_at DESC",
            BOOK_COLUMNS
        ))
        .bind(user_uid)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Fetch a book or fail with the resource-level not-found.
    pub async fn get_book(&self, book_uid: Uuid) -> Result<Book> {
        sqlx::query_as::<_, Book>(&format!(
            "SELECT {} FROM books WHERE uid = $1",
            BOOK_COLUMNS
        ))
        .bind(book_uid)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }

    pub async fn get_book_with_reviews(&self, book_uid: Uuid) -> Result<(Book, Vec<Review>)> {
        let book = self.get_book(book_uid).await?;

        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT uid, user_uid, book_uid, content, rating, created_at, updated_at
            FROM reviews
            WHERE book_uid = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(book_uid)
        .fetch_all(&self.pool)
        .await?;

        Ok((book, reviews))
    }

    /// Create a book owned by the acting user.
    pub async fn create_book(&self, data: NewBook, owner_uid: Uuid) -> Result<Book> {
        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (user_uid, title, author, publisher, published_date, page_count, language)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(owner_uid)
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.publisher)
        .bind(&data.published_date)
        .bind(data.page_count)
        .bind(&data.language)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(uid = %book.uid, owner = %owner_uid, "Book created");
        Ok(book)
    }

    /// Partial update, owner only. The ownership check runs before the
    /// write; a denied request leaves the row untouched.
    pub async fn update_book(
        &self,
        book_uid: Uuid,
        patch: BookPatch,
        acting_uid: Uuid,
    ) -> Result<Book> {
        let book = self.get_book(book_uid).await?;
        ensure_owner(book.user_uid, acting_uid)?;

        let updated = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author = COALESCE($3, author),
                publisher = COALESCE($4, publisher),
                published_date = COALESCE($5, published_date),
                page_count = COALESCE($6, page_count),
                language = COALESCE($7, language),
                updated_at = NOW()
            WHERE uid = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(book_uid)
        .bind(patch.title)
        .bind(patch.author)
        .bind(patch.publisher)
        .bind(patch.published_date)
        .bind(patch.page_count)
        .bind(patch.language)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete a book, owner only. Reviews and tag links go with it via the
    /// schema's cascades.
    pub async fn delete_book(&self, book_uid: Uuid, acting_uid: Uuid) -> Result<()> {
        let book = self.get_book(book_uid).await?;
        ensure_owner(book.user_uid, acting_uid)?;

        sqlx::query("DELETE FROM books WHERE uid = $1")
            .bind(book_uid)
            .execute(&self.pool)
            .await?;

        tracing::info!(uid = %book_uid, "Book deleted");
        Ok(())
    }
}
