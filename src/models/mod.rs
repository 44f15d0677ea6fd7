/// Data models for catalog-service
///
/// Row types backing the five tables: users, books, reviews, tags, and the
/// book_tags association. These map 1:1 onto the migration schema; the
/// request/response DTOs live next to their handlers.
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A registered user account.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub uid: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cataloged book. `user_uid` is nullable in the schema but set to the
/// acting user on every create; it is the ownership anchor for mutations.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Book {
    pub uid: Uuid,
    pub user_uid: Option<Uuid>,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub published_date: String,
    pub page_count: i32,
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A review written by a user about a book.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Review {
    pub uid: Uuid,
    pub user_uid: Option<Uuid>,
    pub book_uid: Option<Uuid>,
    pub content: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tag shared across books (many-to-many). Tags carry no owner of their
/// own; mutation is gated through the linked book.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Tag {
    pub uid: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
