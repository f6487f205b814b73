use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::{
    entities::email::{EmailReceipt, OutgoingEmail},
    errors::DispatchError,
    repositories::mailer::EmailDispatcher,
    settings::AppConfig,
};

/// Resend transactional email API client.
#[derive(Clone)]
pub struct ResendMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: Zeroizing<String>,
}

#[derive(Debug, Deserialize)]
struct ResendErrorBody {
    message: Option<String>,
    name: Option<String>,
}

impl ResendMailer {
    pub fn new(api_url: &str, api_key: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(ResendMailer {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: Zeroizing::new(api_key.trim().to_string()),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        Self::new(&config.resend_api_url, &config.resend_api_key, config.http_timeout())
    }
}

#[async_trait]
impl EmailDispatcher for ResendMailer {
    async fn dispatch(&self, email: &OutgoingEmail) -> Result<EmailReceipt, DispatchError> {
        if self.api_key.is_empty() {
            return Err(DispatchError::MissingApiKey);
        }

        let response = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(self.api_key.as_str())
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<EmailReceipt>()
                .await
                .map_err(|e| DispatchError::InvalidResponse(e.to_string()));
        }

        let detail = match response.json::<ResendErrorBody>().await {
            Ok(ResendErrorBody { message: Some(message), .. }) => message,
            Ok(ResendErrorBody { name: Some(name), .. }) => name,
            _ => format!("Provider responded with {}", status),
        };
        tracing::warn!(status = %status, detail = %detail, "Resend rejected email");
        Err(DispatchError::Rejected(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            from: "Site <onboarding@resend.dev>".into(),
            to: vec!["owner@example.com".into()],
            reply_to: "ann@x.com".into(),
            subject: "New Contact: General Inquiry from Ann".into(),
            html: "<p>Hi</p>".into(),
            text: "Hi".into(),
        }
    }

    fn mailer(server: &MockServer, key: &str) -> ResendMailer {
        ResendMailer::new(&server.uri(), key, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn returns_provider_id_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_test"))
            .and(body_partial_json(json!({
                "reply_to": "ann@x.com",
                "to": ["owner@example.com"],
                "subject": "New Contact: General Inquiry from Ann"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "4ef9a417"})))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = mailer(&server, "re_test").dispatch(&email()).await.unwrap();

        assert_eq!(receipt.id, "4ef9a417");
    }

    #[tokio::test]
    async fn surfaces_provider_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "statusCode": 401,
                "name": "validation_error",
                "message": "API key is invalid"
            })))
            .mount(&server)
            .await;

        let err = mailer(&server, "re_bad").dispatch(&email()).await.unwrap_err();

        assert_eq!(err, DispatchError::Rejected("API key is invalid".into()));
    }

    #[tokio::test]
    async fn missing_key_fails_without_calling_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = mailer(&server, "  ").dispatch(&email()).await.unwrap_err();

        assert_eq!(err, DispatchError::MissingApiKey);
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_transport_error() {
        let mailer = ResendMailer::new("http://127.0.0.1:9", "re_test", Duration::from_secs(2)).unwrap();

        let err = mailer.dispatch(&email()).await.unwrap_err();

        assert!(matches!(err, DispatchError::Transport(_)));
    }
}
