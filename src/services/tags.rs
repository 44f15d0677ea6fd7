/// Tag service - shared tags linked to books many-to-many
///
/// Tags have no owner of their own; attach and detach authorize against the
/// linked book's owner. Tag names match exactly and case-sensitively, with
/// no normalization.
use crate::error::{AppError, Result};
use crate::models::{Book, Review, Tag};
use crate::policy::ensure_owner;
use sqlx::PgPool;
use uuid::Uuid;

const TAG_COLUMNS: &str = "uid, name, created_at, updated_at";

pub struct TagService {
    pool: PgPool,
}

impl TagService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(&format!(
            "SELECT {} FROM tags ORDER BY created_at DESC",
            TAG_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    pub async fn get_tag(&self, tag_uid: Uuid) -> Result<Tag> {
        sqlx::query_as::<_, Tag>(&format!("SELECT {} FROM tags WHERE uid = $1", TAG_COLUMNS))
            .bind(tag_uid)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Tag not found".to_string()))
    }

    /// Books carrying the tag, each with its reviews.
    pub async fn get_books_by_tag(&self, tag_uid: Uuid) -> Result<Vec<(Book, Vec<Review>)>> {
        // Existence first so an unknown tag is a 404, not an empty list
        self.get_tag(tag_uid).await?;

        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.uid, b.user_uid, b.title, b.author, b.publisher, b.published_date,
                   b.page_count, b.language, b.created_at, b.updated_at
            FROM books b
            JOIN book_tags bt ON bt.book_uid = b.uid
            WHERE bt.tag_uid = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(tag_uid)
        .fetch_all(&self.pool)
        .await?;

        let book_uids: Vec<Uuid> = books.iter().map(|b| b.uid).collect();
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT uid, user_uid, book_uid, content, rating, created_at, updated_at
            FROM reviews
            WHERE book_uid = ANY($1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(&book_uids)
        .fetch_all(&self.pool)
        .await?;

        Ok(books
            .into_iter()
            .map(|book| {
                let book_reviews = reviews
                    .iter()
                    .filter(|r| r.book_uid == Some(book.uid))
                    .cloned()
                    .collect();
                (book, book_reviews)
            })
            .collect())
    }

    pub async fn list_tags_for_book(&self, book_uid: Uuid) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.uid, t.name, t.created_at, t.updated_at
            FROM tags t
            JOIN book_tags bt ON bt.tag_uid = t.uid
            WHERE bt.book_uid = $1
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(book_uid)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    /// Attach named tags to a book, owner only.
    ///
    /// Each name is created if no tag with that exact name exists;
    /// attaching an already-attached tag is a silent no-op. The whole
    /// attach runs in one transaction.
    pub async fn add_tags_to_book(
        &self,
        book_uid: Uuid,
        tag_names: &[String],
        acting_uid: Uuid,
    ) -> Result<(Book, Vec<Tag>)> {
        let book = self.fetch_book(book_uid).await?;
        ensure_owner(book.user_uid, acting_uid)?;

        let mut tx = self.pool.begin().await?;

        for name in tag_names {
            // Upsert keyed on the unique name; the no-op DO UPDATE makes
            // RETURNING yield the row whether it was inserted or found
            let tag = sqlx::query_as::<_, Tag>(&format!(
                r#"
                INSERT INTO tags (name)
                VALUES ($1)
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                RETURNING {}
                "#,
                TAG_COLUMNS
            ))
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                "INSERT INTO book_tags (book_uid, tag_uid) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(book_uid)
            .bind(tag.uid)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        let tags = self.list_tags_for_book(book_uid).await?;
        tracing::info!(book = %book_uid, count = tag_names.len(), "Tags attached");
        Ok((book, tags))
    }

    /// Detach a tag from a book, owner only. A tag not attached to the
    /// book is a not-found, whether or not the tag exists elsewhere.
    pub async fn remove_tag_from_book(
        &self,
        book_uid: Uuid,
        tag_uid: Uuid,
        acting_uid: Uuid,
    ) -> Result<(Book, Vec<Tag>)> {
        let book = self.fetch_book(book_uid).await?;
        ensure_owner(book.user_uid, acting_uid)?;

        let result = sqlx::query("DELETE FROM book_tags WHERE book_uid = $1 AND tag_uid = $2")
            .bind(book_uid)
            .bind(tag_uid)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Tag not found in this book".to_string()));
        }

        let tags = self.list_tags_for_book(book_uid).await?;
        Ok((book, tags))
    }

    async fn fetch_book(&self, book_uid: Uuid) -> Result<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            SELECT uid, user_uid, title, author, publisher, published_date, page_count,
                   language, created_at, updated_at
            FROM books
            WHERE uid = $1
            "#,
        )
        .bind(book_uid)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".to_string()))
    }
}
