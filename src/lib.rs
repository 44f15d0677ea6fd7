//! Catalog Service
//!
//! A REST backend for a book catalog: user accounts, JWT-based
//! authentication with a Redis revocation registry, and ownership-gated
//! CRUD over books, reviews, and tags.
//!
//! # Architecture
//!
//! - HTTP handlers with request/response DTOs ([`handlers`])
//! - Auth middleware and request extractors ([`middleware`])
//! - Token codec, password hashing, revocation registry ([`security`])
//! - Business logic over PostgreSQL ([`services`])
//! - Ownership rule shared by every mutating path ([`policy`])

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod security;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
