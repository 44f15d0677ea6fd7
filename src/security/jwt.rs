/// Signed token issuance and validation
///
/// Tokens are HS256 JWTs carrying a user summary, an expiry, a fresh `jti`
/// (the revocation key), and a flag separating access from refresh tokens:
///
/// ```json
/// {"user": {"email": "...", "uid": "...", "role": "..."}, "exp": 1700000000,
///  "jti": "...", "refresh": false}
/// ```
///
/// The codec is built once at startup from the configured secret and passed
/// by reference into the auth middleware and handlers; there is no global
/// key state.
use crate::config::JwtConfig;
use crate::error::{AppError, Result};
use anyhow::ensure;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default access token lifetime (seconds).
pub const ACCESS_TOKEN_TTL_SECS: i64 = 3600;

/// Refresh token lifetime used by the login flow (seconds).
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 3600;

const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

/// Token class required by an endpoint's guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Access,
    Refresh,
}

/// Principal summary embedded in every token.
///
/// `role` is present on access tokens and omitted from refresh tokens, as
/// the login flow issues them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserClaim {
    pub email: String,
    pub uid: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Decoded claim set of a validated token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub user: UserClaim,
    pub exp: i64,
    pub jti: String,
    pub refresh: bool,
}

impl Claims {
    pub fn class(&self) -> TokenClass {
        if self.refresh {
            TokenClass::Refresh
        } else {
            TokenClass::Access
        }
    }
}

/// Token decode failure.
///
/// Expiry is distinguishable for callers that care, but the auth guard
/// reports both cases identically as "invalid or expired" so that decode
/// diagnostics never leak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    Expired,
    Invalid,
}

/// Encodes and decodes signed tokens with a process-wide secret.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenCodec {
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> anyhow::Result<Self> {
        ensure!(!secret.is_empty(), "JWT secret must not be empty");
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_secs,
            refresh_ttl_secs,
        })
    }

    pub fn from_config(config: &JwtConfig) -> anyhow::Result<Self> {
        Self::new(
            &config.secret,
            config.access_ttl_secs as i64,
            config.refresh_ttl_secs as i64,
        )
    }

    /// Issue a signed token for `user` with the given class and lifetime.
    ///
    /// Every call mints a fresh `jti`; reusing ids would break revocation.
    pub fn issue(&self, user: UserClaim, class: TokenClass, ttl_secs: i64) -> Result<String> {
        let claims = Claims {
            user,
            exp: (Utc::now() + Duration::seconds(ttl_secs)).timestamp(),
            jti: Uuid::new_v4().to_string(),
            refresh: class == TokenClass::Refresh,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Issue an access token with the configured default lifetime.
    pub fn issue_access(&self, user: UserClaim) -> Result<String> {
        self.issue(user, TokenClass::Access, self.access_ttl_secs)
    }

    /// Issue a refresh token with the configured refresh lifetime.
    pub fn issue_refresh(&self, user: UserClaim) -> Result<String> {
        self.issue(user, TokenClass::Refresh, self.refresh_ttl_secs)
    }

    /// Verify signature, structure, and expiry; return the claim set.
    pub fn parse(&self, token: &str) -> std::result::Result<Claims, DecodeError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(DecodeError::Expired),
                _ => Err(DecodeError::Invalid),
            },
        }
    }
}
