//! Integration tests for botwatch-alerts
//!
//! These tests verify the interaction between multiple components
//! against real SQLite databases, files and HTTP servers.

pub mod config_tests;
pub mod database_tests;
pub mod engine_tests;
pub mod sendgrid_tests;
