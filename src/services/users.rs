/// User service - account creation and principal lookup
use crate::error::{AppError, Result};
use crate::models::User;
use crate::security::password::hash_password;
use sqlx::PgPool;

const USER_COLUMNS: &str =
    "uid, username, email, role, password_hash, is_verified, created_at, updated_at";

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up a user by email. This is the principal-resolution query the
    /// auth layer runs on every request that needs a full account record.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Create a new account with role "user" and a hashed password.
    pub async fn create_user(&self, username: &str, email: &str, password: &str) -> Result<User> {
        if self.get_user_by_email(email).await?.is_some() {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, role, password_hash)
            VALUES ($1, $2, 'user', $3)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            // Lost the race against a concurrent signup with the same email
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("User with this email already exists".to_string())
            }
            _ => AppError::from(e),
        })?;

        tracing::info!(uid = %user.uid, "User account created");
        Ok(user)
    }
}
