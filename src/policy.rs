//! Ownership rule evaluator
//!
//! One rule, applied uniformly across book and review mutations: the acting
//! user must be the resource's owner. Evaluated before any persistence
//! write; a resource without an owner cannot be mutated through this path.

use crate::error::{AppError, Result};
use uuid::Uuid;

/// Allow iff `owner == Some(acting)`.
pub fn ensure_owner(owner: Option<Uuid>, acting: Uuid) -> Result<()> {
    match owner {
        Some(uid) if uid == acting => Ok(()),
        _ => Err(AppError::Forbidden(
            "You are not authorized to modify this resource".to_string(),
        )),
    }
}
