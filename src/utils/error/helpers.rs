//! Helper functions for creating and classifying errors

use super::types::AlertError;

impl AlertError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn permission<S: Into<String>>(message: S) -> Self {
        Self::Permission(message.into())
    }

    pub fn authorization<S: Into<String>>(message: S) -> Self {
        Self::Authorization(message.into())
    }

    pub fn delivery<S: Into<String>>(message: S) -> Self {
        Self::Delivery(message.into())
    }

    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Self::Persistence(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error came from the storage layer
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Database(_))
    }

    /// Whether the error came from a channel send
    pub fn is_delivery(&self) -> bool {
        matches!(self, Self::Delivery(_) | Self::Timeout(_) | Self::HttpClient(_))
    }

    /// Number of underlying failures (1 for non-aggregate errors)
    pub fn failure_count(&self) -> usize {
        match self {
            Self::Aggregate(errors) => errors.len(),
            _ => 1,
        }
    }
}
