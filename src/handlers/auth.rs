/// Account and token lifecycle handlers
///
/// signup and login are the only unauthenticated endpoints. refresh runs
/// behind the refresh-class guard, logout and me behind the access-class
/// guard; both read the admitted claims from the request extensions.
use crate::error::{AppError, Result};
use crate::middleware::{AuthClaims, CurrentUser, RoleChecker};
use crate::security::{RevocationStore, TokenCodec, UserClaim};
use crate::services::{BookService, ReviewService, UserService};
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 32, message = "username must be 3 to 32 characters"))]
    pub username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub password: String,
}

/// Book titles and review bodies on the profile payload; the full records
/// stay behind their own endpoints.
#[derive(Debug, Serialize)]
struct ProfileBook {
    title: String,
}

#[derive(Debug, Serialize)]
struct ProfileReview {
    content: String,
    rating: i32,
}

pub async fn signup(
    pool: web::Data<PgPool>,
    payload: web::Json<SignupRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let user = UserService::new(pool.get_ref().clone())
        .create_user(&payload.username, &payload.email, &payload.password)
        .await?;

    Ok(HttpResponse::Created().json(user))
}

pub async fn login(
    pool: web::Data<PgPool>,
    codec: web::Data<TokenCodec>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let user = UserService::new(pool.get_ref().clone())
        .get_user_by_email(&payload.email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !crate::security::password::verify_password(&payload.password, &user.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    let access_token = codec.issue_access(UserClaim {
        email: user.email.clone(),
        uid: user.uid,
        role: Some(user.role.clone()),
    })?;

    // Refresh tokens carry no role; it is re-read from the database when
    // the account is resolved
    let refresh_token = codec.issue_refresh(UserClaim {
        email: user.email.clone(),
        uid: user.uid,
        role: None,
    })?;

    tracing::info!(uid = %user.uid, "User logged in");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Login successful",
        "access_token": access_token,
        "refresh_token": refresh_token,
        "user": {
            "email": user.email,
            "uid": user.uid,
        }
    })))
}

/// Mint a fresh access token from an admitted refresh token. The guard has
/// already validated expiry; the recheck here keeps the handler safe if it
/// is ever wired up without the guard.
pub async fn refresh_token(
    codec: web::Data<TokenCodec>,
    claims: AuthClaims,
) -> Result<HttpResponse> {
    if claims.0.exp <= chrono::Utc::now().timestamp() {
        return Err(AppError::BadRequest(
            "Invalid or expired refresh token".to_string(),
        ));
    }

    let access_token = codec.issue_access(claims.0.user)?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Token refreshed successfully",
        "access_token": access_token,
    })))
}

/// Profile of the acting user with their books and reviews.
pub async fn me(pool: web::Data<PgPool>, user: CurrentUser) -> Result<HttpResponse> {
    RoleChecker::new(["admin", "user"]).check(&user.0)?;

    let books = BookService::new(pool.get_ref().clone())
        .list_by_user(user.0.uid)
        .await?;
    let reviews = ReviewService::new(pool.get_ref().clone())
        .list_by_user(user.0.uid)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "uid": user.0.uid,
        "username": user.0.username,
        "email": user.0.email,
        "role": user.0.role,
        "is_verified": user.0.is_verified,
        "books": books
            .into_iter()
            .map(|b| ProfileBook { title: b.title })
            .collect::<Vec<_>>(),
        "reviews": reviews
            .into_iter()
            .map(|r| ProfileReview {
                content: r.content,
                rating: r.rating,
            })
            .collect::<Vec<_>>(),
    })))
}

/// Revoke the presented token's `jti`. The registry write itself is
/// idempotent, but a repeated logout with the same token never reaches
/// this handler: the guard rejects the now-revoked token first.
pub async fn logout(
    revocation: web::Data<dyn RevocationStore>,
    claims: AuthClaims,
) -> Result<HttpResponse> {
    revocation.revoke(&claims.0.jti).await?;

    tracing::info!(uid = %claims.0.user.uid, "User logged out");

    Ok(HttpResponse::Ok().json(json!({ "message": "Logout successful" })))
}
