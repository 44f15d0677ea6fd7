/// Tag handlers, access-guarded. Attach and detach return the book with
/// its current tag set so clients can refresh in one round trip.
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::{Book, Tag};
use crate::services::TagService;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::books::BookDetail;

#[derive(Debug, Deserialize)]
pub struct AddTagsRequest {
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
struct BookTags {
    #[serde(flatten)]
    book: Book,
    tags: Vec<Tag>,
}

pub async fn list_tags(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let tags = TagService::new(pool.get_ref().clone()).list_all().await?;
    Ok(HttpResponse::Ok().json(tags))
}

pub async fn get_tag(pool: web::Data<PgPool>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let tag = TagService::new(pool.get_ref().clone())
        .get_tag(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(tag))
}

/// All books carrying the tag, with their reviews.
pub async fn books_by_tag(pool: web::Data<PgPool>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let books = TagService::new(pool.get_ref().clone())
        .get_books_by_tag(path.into_inner())
        .await?;

    let payload: Vec<BookDetail> = books
        .into_iter()
        .map(|(book, reviews)| BookDetail { book, reviews })
        .collect();
    Ok(HttpResponse::Ok().json(payload))
}

pub async fn add_tags_to_book(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    payload: web::Json<AddTagsRequest>,
) -> Result<HttpResponse> {
    let (book, tags) = TagService::new(pool.get_ref().clone())
        .add_tags_to_book(path.into_inner(), &payload.tags, user.0.uid)
        .await?;
    Ok(HttpResponse::Ok().json(BookTags { book, tags }))
}

pub async fn remove_tag_from_book(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (book_uid, tag_uid) = path.into_inner();
    let (book, tags) = TagService::new(pool.get_ref().clone())
        .remove_tag_from_book(book_uid, tag_uid, user.0.uid)
        .await?;
    Ok(HttpResponse::Ok().json(BookTags { book, tags }))
}
