/// Review handlers, access-guarded; the author is resolved through the
/// database so a deleted account cannot post under a still-valid token.
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::services::{NewReview, ReviewPatch, ReviewService};
use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

pub async fn add_review(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    payload: web::Json<NewReview>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let review = ReviewService::new(pool.get_ref().clone())
        .add_review(path.into_inner(), user.0.uid, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(review))
}

pub async fn update_review(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    payload: web::Json<ReviewPatch>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let review = ReviewService::new(pool.get_ref().clone())
        .update_review(path.into_inner(), payload.into_inner(), user.0.uid)
        .await?;
    Ok(HttpResponse::Ok().json(review))
}

pub async fn delete_review(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    ReviewService::new(pool.get_ref().clone())
        .delete_review(path.into_inner(), user.0.uid)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Review deleted successfully" })))
}
