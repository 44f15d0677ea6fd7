/// Error types for Catalog Service
///
/// Every failure maps to a stable (status, message) pair. Internal
/// database/redis/JWT detail is logged but never returned to clients.
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Missing authorization credentials")]
    MissingCredential,

    #[error("This token is invalid or has expired")]
    InvalidOrExpiredToken,

    #[error("This token has been revoked, please obtain a new token")]
    RevokedToken,

    #[error("{0}")]
    WrongTokenClass(&'static str),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User not found")]
    PrincipalNotFound,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Redis error: {0}")]
    Redis(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingCredential
            | AppError::InvalidOrExpiredToken
            | AppError::RevokedToken
            | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::WrongTokenClass(_) | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::PrincipalNotFound | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Redis(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {}", err);
        AppError::Database(err.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        tracing::error!("Redis error: {}", err);
        AppError::Redis(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_map_to_401() {
        assert_eq!(
            AppError::MissingCredential.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::InvalidOrExpiredToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::RevokedToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn forbidden_and_not_found_stay_distinct() {
        assert_eq!(
            AppError::Forbidden("ownership".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("Book not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        // The one deliberate quirk: a structurally valid token pointing at a
        // deleted account surfaces as 404, not 401.
        assert_eq!(
            AppError::PrincipalNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let err = AppError::Database("connection refused on 10.0.0.3".into());
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = actix_web::body::to_bytes(resp.into_body());
        let body = futures::executor::block_on(body).expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["error"], "Internal server error");
    }

    #[test]
    fn duplicate_email_is_conflict() {
        assert_eq!(
            AppError::Conflict("User with this email already exists".into()).status_code(),
            StatusCode::CONFLICT
        );
    }
}
