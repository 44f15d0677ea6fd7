/// Token revocation registry
///
/// TTL-based denylist of token ids (`jti`), backed by Redis. An entry is
/// created on logout and read on every authenticated request; absence,
/// including absence caused by TTL expiry, means "not revoked".
use crate::error::{AppError, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;

/// Lifetime of a revocation entry (seconds). Fixed at the access-token
/// lifetime and independent of the revoked token's own remaining validity:
/// a revoked refresh token outlives its denylist entry and becomes usable
/// again after one hour. Preserved as-is; see the TTL test below.
pub const JTI_TTL_SECS: u64 = 3600;

const KEY_PREFIX: &str = "catalog:revoked:jti:";

fn jti_key(jti: &str) -> String {
    format!("{}{}", KEY_PREFIX, jti)
}

/// Key-value store with per-key expiry, as the guard consumes it. The
/// production implementation is [`RevocationRegistry`]; tests substitute an
/// in-memory store.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn revoke(&self, jti: &str) -> Result<()>;
    async fn is_revoked(&self, jti: &str) -> Result<bool>;
}

/// Redis-backed revocation registry.
#[derive(Clone)]
pub struct RevocationRegistry {
    redis: ConnectionManager,
}

impl RevocationRegistry {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl RevocationStore for RevocationRegistry {
    async fn revoke(&self, jti: &str) -> Result<()> {
        let mut conn = self.redis.clone();
        redis::cmd("SET")
            .arg(jti_key(jti))
            .arg("")
            .arg("EX")
            .arg(JTI_TTL_SECS)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        tracing::info!(%jti, ttl_secs = JTI_TTL_SECS, "Token revoked");
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool> {
        let mut conn = self.redis.clone();
        let exists: bool = redis::cmd("EXISTS")
            .arg(jti_key(jti))
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::Redis(e.to_string()))?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::jwt::REFRESH_TOKEN_TTL_SECS;

    #[test]
    fn keys_are_namespaced_by_jti() {
        let key = jti_key("abc-123");
        assert_eq!(key, "catalog:revoked:jti:abc-123");
        assert_ne!(jti_key("a"), jti_key("b"));
    }

    /// Known gap carried over from the original system: the denylist entry
    /// expires after 3600 s while a refresh token lives 7 days, so a
    /// logged-out refresh token is effectively un-revoked after one hour.
    /// This test pins the behavior so any fix is a conscious one.
    #[test]
    fn revocation_ttl_shorter_than_refresh_lifetime() {
        assert_eq!(JTI_TTL_SECS, 3600);
        assert!((JTI_TTL_SECS as i64) < REFRESH_TOKEN_TTL_SECS);
    }
}
