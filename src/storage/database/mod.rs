//! Database storage implementation using SeaORM
//!
//! This module provides database connectivity and the [`AlertStore`]
//! operations for SQLite and Postgres.
//!
//! [`AlertStore`]: super::AlertStore

/// Database entities module
pub mod entities;
/// Database migration module
pub mod migration;
/// SeaORM alert store module
pub mod seaorm_db;

pub use seaorm_db::{DatabaseBackendType, SeaOrmAlertStore};
