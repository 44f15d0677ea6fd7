/// Role-based access control
///
/// A stateless predicate layered after principal resolution: the route
/// declares the roles it admits, the resolved user either carries one or
/// the request is denied.
use crate::error::{AppError, Result};
use crate::models::User;

#[derive(Debug, Clone)]
pub struct RoleChecker {
    allowed_roles: Vec<String>,
}

impl RoleChecker {
    pub fn new<I, S>(allowed_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_roles: allowed_roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn check(&self, user: &User) -> Result<()> {
        if self.allowed_roles.iter().any(|r| r == &user.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "You do not have permission to access this resource".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user_with_role(role: &str) -> User {
        User {
            uid: Uuid::new_v4(),
            username: "reader".to_string(),
            email: "reader@example.com".to_string(),
            role: role.to_string(),
            password_hash: String::new(),
            is_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn member_role_is_admitted() {
        let checker = RoleChecker::new(["admin", "user"]);
        assert!(checker.check(&user_with_role("user")).is_ok());
        assert!(checker.check(&user_with_role("admin")).is_ok());
    }

    #[test]
    fn unknown_role_is_forbidden() {
        let checker = RoleChecker::new(["admin"]);
        assert!(matches!(
            checker.check(&user_with_role("user")),
            Err(AppError::Forbidden(_))
        ));
    }
}
