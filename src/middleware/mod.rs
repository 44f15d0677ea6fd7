/// HTTP middleware for catalog-service
///
/// `AuthGuard` is the request-time gate: it validates the bearer token's
/// signature and expiry, checks the revocation registry, enforces the
/// endpoint's required token class, and stores the decoded claims in the
/// request extensions for the extractors below. One guard type covers both
/// variants; the required class is a constructor parameter.
pub mod permissions;

pub use permissions::RoleChecker;

use crate::error::AppError;
use crate::security::{Claims, RevocationStore, TokenClass, TokenCodec};
use crate::services::UserService;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

/// Pull the bearer token out of the Authorization header.
fn extract_bearer(req: &ServiceRequest) -> Result<String, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::MissingCredential)?;

    header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .ok_or(AppError::MissingCredential)
}

/// Class check applied after decode and revocation: the endpoint declares
/// what it accepts, the token says what it is.
fn check_class(claims: &Claims, required: TokenClass) -> Result<(), AppError> {
    match (claims.class(), required) {
        (TokenClass::Access, TokenClass::Access) | (TokenClass::Refresh, TokenClass::Refresh) => {
            Ok(())
        }
        (TokenClass::Refresh, TokenClass::Access) => {
            Err(AppError::WrongTokenClass("Please provide an access token"))
        }
        (TokenClass::Access, TokenClass::Refresh) => {
            Err(AppError::WrongTokenClass("Please provide a refresh token"))
        }
    }
}

/// Bearer-token authentication middleware parameterized by required class.
#[derive(Clone)]
pub struct AuthGuard {
    codec: Arc<TokenCodec>,
    revocation: Arc<dyn RevocationStore>,
    required: TokenClass,
}

impl AuthGuard {
    pub fn access(codec: Arc<TokenCodec>, revocation: Arc<dyn RevocationStore>) -> Self {
        Self {
            codec,
            revocation,
            required: TokenClass::Access,
        }
    }

    pub fn refresh(codec: Arc<TokenCodec>, revocation: Arc<dyn RevocationStore>) -> Self {
        Self {
            codec,
            revocation,
            required: TokenClass::Refresh,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGuardService {
            service: Rc::new(service),
            codec: self.codec.clone(),
            revocation: self.revocation.clone(),
            required: self.required,
        }))
    }
}

pub struct AuthGuardService<S> {
    service: Rc<S>,
    codec: Arc<TokenCodec>,
    revocation: Arc<dyn RevocationStore>,
    required: TokenClass,
}

impl<S, B> Service<ServiceRequest> for AuthGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let codec = self.codec.clone();
        let revocation = self.revocation.clone();
        let required = self.required;

        Box::pin(async move {
            let token = extract_bearer(&req)?;

            let claims = codec.parse(&token).map_err(|e| {
                tracing::warn!("Token validation failed: {:?}", e);
                AppError::InvalidOrExpiredToken
            })?;

            if revocation.is_revoked(&claims.jti).await? {
                return Err(AppError::RevokedToken.into());
            }

            check_class(&claims, required)?;

            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}

/// Decoded claim set of the admitted token, for handlers that work on the
/// claims directly (logout, refresh).
#[derive(Debug, Clone)]
pub struct AuthClaims(pub Claims);

impl FromRequest for AuthClaims {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Claims>()
                .cloned()
                .map(AuthClaims)
                .ok_or_else(|| AppError::MissingCredential.into()),
        )
    }
}

/// The fully resolved acting user.
///
/// Looks up the account record behind the admitted token's email claim. A
/// valid token whose account has been deleted resolves to 404, not 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub crate::models::User);

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let pool = req.app_data::<web::Data<PgPool>>().cloned();

        Box::pin(async move {
            let claims = claims.ok_or(AppError::MissingCredential)?;
            let pool = pool.ok_or_else(|| {
                AppError::Internal("Database pool not configured".to_string())
            })?;

            let user = UserService::new(pool.get_ref().clone())
                .get_user_by_email(&claims.user.email)
                .await?
                .ok_or(AppError::PrincipalNotFound)?;

            Ok(CurrentUser(user))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::UserClaim;
    use uuid::Uuid;

    fn claims(refresh: bool) -> Claims {
        Claims {
            user: UserClaim {
                email: "reader@example.com".to_string(),
                uid: Uuid::new_v4(),
                role: Some("user".to_string()),
            },
            exp: chrono::Utc::now().timestamp() + 3600,
            jti: Uuid::new_v4().to_string(),
            refresh,
        }
    }

    #[test]
    fn class_check_accepts_matching_class() {
        assert!(check_class(&claims(false), TokenClass::Access).is_ok());
        assert!(check_class(&claims(true), TokenClass::Refresh).is_ok());
    }

    #[test]
    fn class_check_rejects_mismatch_both_ways() {
        assert!(matches!(
            check_class(&claims(true), TokenClass::Access),
            Err(AppError::WrongTokenClass(_))
        ));
        assert!(matches!(
            check_class(&claims(false), TokenClass::Refresh),
            Err(AppError::WrongTokenClass(_))
        ));
    }
}
