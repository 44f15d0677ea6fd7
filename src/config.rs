//! Configuration management for Catalog Service
//!
//! Settings are loaded from environment variables, with a `.env` file picked
//! up in debug builds. The JWT signing secret is the only hard requirement;
//! everything else falls back to development defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
}

impl Config {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        if cfg!(debug_assertions) {
            dotenvy::dotenv().ok();
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            cors: CorsConfig::from_env(),
            database: DatabaseConfig::from_env()?,
            redis: RedisConfig::from_env(),
            jwt: JwtConfig::from_env()?,
        })
    }
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid SERVER_PORT")?,
        })
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

impl CorsConfig {
    fn from_env() -> Self {
        Self {
            allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,
            min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("Invalid DATABASE_MIN_CONNECTIONS")?,
            acquire_timeout_secs: env::var("DATABASE_ACQUIRE_TIMEOUT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid DATABASE_ACQUIRE_TIMEOUT")?,
            idle_timeout_secs: env::var("DATABASE_IDLE_TIMEOUT")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .context("Invalid DATABASE_IDLE_TIMEOUT")?,
        })
    }
}

/// Redis settings for the token revocation registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

impl RedisConfig {
    fn from_env() -> Self {
        Self {
            url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        }
    }
}

/// JWT token settings
///
/// The signing secret is process-wide immutable configuration; a missing
/// secret is a startup failure, never a per-request one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

impl JwtConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_ttl_secs: env::var("JWT_ACCESS_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .context("Invalid JWT_ACCESS_TTL_SECS")?,
            refresh_ttl_secs: env::var("JWT_REFRESH_TTL_SECS")
                .unwrap_or_else(|_| "604800".to_string())
                .parse()
                .context("Invalid JWT_REFRESH_TTL_SECS")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn jwt_config_from_env() {
        env::set_var("JWT_SECRET", "test-secret-key");
        env::set_var("JWT_ACCESS_TTL_SECS", "1800");

        let cfg = JwtConfig::from_env().unwrap();
        assert_eq!(cfg.secret, "test-secret-key");
        assert_eq!(cfg.access_ttl_secs, 1800);
        assert_eq!(cfg.refresh_ttl_secs, 604800); // default: 7 days

        env::remove_var("JWT_SECRET");
        env::remove_var("JWT_ACCESS_TTL_SECS");
    }

    #[test]
    #[serial]
    fn jwt_secret_is_required() {
        env::remove_var("JWT_SECRET");
        assert!(JwtConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn database_config_from_env() {
        env::set_var("DATABASE_URL", "postgres://localhost/catalog_test");
        env::set_var("DATABASE_MAX_CONNECTIONS", "50");

        let cfg = DatabaseConfig::from_env().unwrap();
        assert_eq!(cfg.url, "postgres://localhost/catalog_test");
        assert_eq!(cfg.max_connections, 50);
        assert_eq!(cfg.min_connections, 5); // default

        env::remove_var("DATABASE_URL");
        env::remove_var("DATABASE_MAX_CONNECTIONS");
    }
}
