//! SendGrid channel tests against a mock HTTP server

#[cfg(test)]
mod tests {
    use crate::{assert_err, assert_ok};
    use botwatch_alerts::config::EmailConfig;
    use botwatch_alerts::{AlertError, Channel, ChannelType, Message, SendGridChannel};
    use serde_json::Value;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn email_config(base_url: &str) -> EmailConfig {
        EmailConfig {
            api_key: "SG.test-key".to_string(),
            from_address: "alerts@example.com".to_string(),
            from_name: Some("Botwatch".to_string()),
            base_url: base_url.to_string(),
        }
    }

    async fn accepting_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .and(header("authorization", "Bearer SG.test-key"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;
        server
    }

    async fn request_bodies(server: &MockServer) -> Vec<Value> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| request.body_json::<Value>().expect("JSON body"))
            .collect()
    }

    #[tokio::test]
    async fn test_send_posts_mail_payload() {
        let server = accepting_server().await;
        let channel = assert_ok!(SendGridChannel::new(
            email_config(&server.uri()),
            Duration::from_secs(5)
        ));
        assert_eq!(channel.channel_type(), ChannelType::Email);

        let message = Message::new(
            "[CRITICAL] Momentum changed status",
            vec!["ops@example.com".to_string(), "desk@example.com".to_string()],
        )
        .with_body("running -> error")
        .with_html_body("<p>running -&gt; error</p>")
        .with_metadata("rule_id", "rule-1");
        assert_ok!(channel.send(&message).await);

        let bodies = request_bodies(&server).await;
        assert_eq!(bodies.len(), 1);
        let body = &bodies[0];
        assert_eq!(body["subject"], "[CRITICAL] Momentum changed status");
        assert_eq!(body["from"]["email"], "alerts@example.com");
        assert_eq!(body["from"]["name"], "Botwatch");
        assert_eq!(body["personalizations"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["personalizations"][1]["to"][0]["email"], "desk@example.com");
        assert_eq!(body["content"][0]["type"], "text/plain");
        assert_eq!(body["content"][1]["type"], "text/html");
        assert_eq!(body["custom_args"]["rule_id"], "rule-1");
    }

    #[tokio::test]
    async fn test_channel_test_defaults_to_from_address() {
        let server = accepting_server().await;
        let channel = assert_ok!(SendGridChannel::new(
            email_config(&server.uri()),
            Duration::from_secs(5)
        ));

        assert_ok!(channel.test("").await);
        assert_ok!(channel.test("user@example.com").await);

        let bodies = request_bodies(&server).await;
        assert_eq!(bodies.len(), 2);
        assert_eq!(
            bodies[0]["personalizations"][0]["to"][0]["email"],
            "alerts@example.com"
        );
        assert_eq!(
            bodies[1]["personalizations"][0]["to"][0]["email"],
            "user@example.com"
        );
    }

    #[tokio::test]
    async fn test_error_status_is_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/mail/send"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"errors":[{"message":"bad key"}]}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let channel = assert_ok!(SendGridChannel::new(
            email_config(&server.uri()),
            Duration::from_secs(5)
        ));
        let message = Message::new("subject", vec!["ops@example.com".to_string()]).with_body("body");

        let err = assert_err!(channel.send(&message).await);
        match err {
            AlertError::Delivery(text) => {
                assert!(text.contains("401"));
                assert!(text.contains("bad key"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_message_is_not_sent() {
        let server = accepting_server().await;
        let channel = assert_ok!(SendGridChannel::new(
            email_config(&server.uri()),
            Duration::from_secs(5)
        ));

        let no_body = Message::new("subject", vec!["ops@example.com".to_string()]);
        assert!(matches!(channel.send(&no_body).await, Err(AlertError::Delivery(_))));
        assert!(matches!(channel.test("not-an-address").await, Err(AlertError::Validation(_))));
        assert!(request_bodies(&server).await.is_empty());
    }

    #[test]
    fn test_missing_credentials_fail_construction() {
        let mut config = email_config("https://api.sendgrid.com");
        config.api_key = String::new();
        let err = assert_err!(SendGridChannel::new(config, Duration::from_secs(5)));
        assert!(matches!(err, AlertError::Config(_)));

        let mut config = email_config("https://api.sendgrid.com");
        config.from_address = String::new();
        let err = assert_err!(SendGridChannel::new(config, Duration::from_secs(5)));
        assert!(matches!(err, AlertError::Config(_)));
    }
}
