//! Tests for error handling

#[cfg(test)]
mod tests {
    use super::super::types::AlertError;

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(AlertError::validation("bad"), AlertError::Validation(msg) if msg == "bad"));
        assert!(matches!(AlertError::permission("no"), AlertError::Permission(_)));
        assert!(matches!(AlertError::delivery("down"), AlertError::Delivery(_)));
        assert!(matches!(AlertError::config("missing"), AlertError::Config(_)));
    }

    #[test]
    fn test_classification() {
        assert!(AlertError::persistence("disk full").is_persistence());
        assert!(AlertError::Database(sea_orm::DbErr::Custom("x".into())).is_persistence());
        assert!(AlertError::delivery("503").is_delivery());
        assert!(AlertError::timeout("send").is_delivery());
        assert!(!AlertError::validation("x").is_delivery());
    }

    #[test]
    fn test_aggregate_display() {
        let error = AlertError::Aggregate(vec![
            AlertError::delivery("provider returned 500"),
            AlertError::persistence("insert failed"),
        ]);

        assert_eq!(error.failure_count(), 2);
        let message = error.to_string();
        assert!(message.starts_with("2 alert dispatch failure(s)"));
        assert!(message.contains("Delivery error: provider returned 500"));
        assert!(message.contains("Persistence error: insert failed"));
    }

    #[test]
    fn test_serde_json_conversion() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: AlertError = err.into();
        assert!(matches!(error, AlertError::Serialization(_)));
    }
}
