//! Common test utilities for botwatch-alerts
//!
//! - In-memory SQLite store support
//! - Rule and event fixtures
//! - Recording channel

pub mod channel;
pub mod database;
pub mod fixtures;

// Re-export commonly used items
pub use channel::RecordingChannel;
pub use database::TestDatabase;
pub use fixtures::{EventFactory, RuleFactory};

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
