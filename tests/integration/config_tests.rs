//! Configuration file loading tests

#[cfg(test)]
mod tests {
    use crate::{assert_err, assert_ok};
    use botwatch_alerts::{AlertError, Config};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write temp config");
        file
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let file = write_config(
            r#"
alerting:
  batch_interval_secs: 300
  max_flush_retries: 5
email:
  api_key: SG.file-key
  from_address: alerts@example.com
logging:
  json: true
"#,
        );

        let config = assert_ok!(Config::from_file(file.path()).await);
        assert_eq!(config.alerting.batch_interval_secs, 300);
        assert_eq!(config.alerting.max_flush_retries, 5);
        assert_eq!(config.alerting.send_timeout_secs, 10);
        assert_eq!(config.alerting.shutdown_grace_secs, 15);
        assert!(config.logging.json);

        let email = assert_ok!(config.require_email());
        assert_eq!(email.from_address, "alerts@example.com");
        assert_eq!(email.from_name, None);
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let err = assert_err!(Config::from_file(dir.path().join("absent.yaml")).await);
        assert!(matches!(err, AlertError::Config(_)));
    }

    #[tokio::test]
    async fn test_batch_interval_must_be_explicit() {
        let file = write_config("alerting:\n  max_flush_retries: 2\n");
        let err = assert_err!(Config::from_file(file.path()).await);
        assert!(matches!(err, AlertError::Config(_)));

        let file = write_config("alerting:\n  batch_interval_secs: 0\n");
        let err = assert_err!(Config::from_file(file.path()).await);
        assert!(matches!(err, AlertError::Config(_)));
    }

    #[tokio::test]
    async fn test_invalid_sender_address_is_rejected() {
        let file = write_config(
            r#"
alerting:
  batch_interval_secs: 60
email:
  api_key: SG.file-key
  from_address: not-an-address
"#,
        );

        let err = assert_err!(Config::from_file(file.path()).await);
        match err {
            AlertError::Config(message) => assert!(message.contains("Email config error")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
