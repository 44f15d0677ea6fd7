/// Book catalog handlers
///
/// Every route here sits behind the access-class guard. Reads are open to
/// any authenticated user; writes check ownership inside the service.
use crate::error::Result;
use crate::middleware::{AuthClaims, CurrentUser};
use crate::models::{Book, Review};
use crate::services::{BookPatch, BookService, NewBook};
use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// A book with its reviews inlined, the detail-view payload.
#[derive(Debug, Serialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    pub reviews: Vec<Review>,
}

pub async fn list_books(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let books = BookService::new(pool.get_ref().clone()).list_all().await?;
    Ok(HttpResponse::Ok().json(books))
}

/// Books owned by the acting user.
pub async fn my_books(pool: web::Data<PgPool>, user: CurrentUser) -> Result<HttpResponse> {
    let books = BookService::new(pool.get_ref().clone())
        .list_by_user(user.0.uid)
        .await?;
    Ok(HttpResponse::Ok().json(books))
}

pub async fn get_book(pool: web::Data<PgPool>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let (book, reviews) = BookService::new(pool.get_ref().clone())
        .get_book_with_reviews(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(BookDetail { book, reviews }))
}

/// Create a book owned by the token's principal. The uid comes straight
/// from the claims; no account lookup is needed here.
pub async fn create_book(
    pool: web::Data<PgPool>,
    claims: AuthClaims,
    payload: web::Json<NewBook>,
) -> Result<HttpResponse> {
    let book = BookService::new(pool.get_ref().clone())
        .create_book(payload.into_inner(), claims.0.user.uid)
        .await?;
    Ok(HttpResponse::Created().json(book))
}

pub async fn update_book(
    pool: web::Data<PgPool>,
    claims: AuthClaims,
    path: web::Path<Uuid>,
    payload: web::Json<BookPatch>,
) -> Result<HttpResponse> {
    let book = BookService::new(pool.get_ref().clone())
        .update_book(path.into_inner(), payload.into_inner(), claims.0.user.uid)
        .await?;
    Ok(HttpResponse::Ok().json(book))
}

pub async fn delete_book(
    pool: web::Data<PgPool>,
    claims: AuthClaims,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    BookService::new(pool.get_ref().clone())
        .delete_book(path.into_inner(), claims.0.user.uid)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Book deleted successfully" })))
}
