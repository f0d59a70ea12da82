//! Resend backend for sending emails
//!
//! Posts to the Resend HTTP API and hands back its JSON response as the
//! delivery receipt.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::config::Secret;
use crate::email::{DeliveryReceipt, Email, EmailError, EmailSender};

/// Resend request body
#[derive(Debug, Serialize)]
struct ResendRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

/// Resend email backend
///
/// # Examples
///
/// ```rust,no_run
/// use ecard::config::Secret;
/// use ecard::email::{Email, EmailSender, ResendBackend};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = ResendBackend::new(
///     reqwest::Client::new(),
///     "https://api.resend.com",
///     Secret::new("re_123"),
/// );
///
/// let email = Email::new()
///     .to("friend@example.com")
///     .from("E-Cards <onboarding@resend.dev>")
///     .subject("Hello!")
///     .html("<p>Hello, World!</p>");
///
/// let receipt = backend.send(email).await?;
/// println!("queued as {:?}", receipt.id());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ResendBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: Secret,
}

impl ResendBackend {
    /// Create a new Resend backend
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: Secret) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/emails", self.base_url)
    }
}

/// Picks the provider's own error message out of a failure body
fn provider_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("email provider returned {status}")
            } else {
                body.to_string()
            }
        })
}

#[async_trait]
impl EmailSender for ResendBackend {
    async fn send(&self, email: Email) -> Result<DeliveryReceipt, EmailError> {
        email.validate()?;

        let from = email.from.as_deref().ok_or(EmailError::NoSender)?;
        let subject = email.subject.as_deref().ok_or(EmailError::NoSubject)?;

        let request = ResendRequest {
            from,
            to: &email.to,
            subject,
            html: email.html.as_deref(),
            text: email.text.as_deref(),
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(self.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| EmailError::provider(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EmailError::provider(e.to_string()))?;

        if !status.is_success() {
            return Err(EmailError::provider(provider_message(status, &body)));
        }

        let receipt: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| EmailError::provider(e.to_string()))?;
        let receipt = DeliveryReceipt(receipt);

        info!(to = ?email.to, id = ?receipt.id(), "Email sent via Resend");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let to = vec!["friend@example.com".to_string()];
        let request = ResendRequest {
            from: "E-Cards <onboarding@resend.dev>",
            to: &to,
            subject: "Hi",
            html: Some("<p>Hi</p>"),
            text: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "from": "E-Cards <onboarding@resend.dev>",
                "to": ["friend@example.com"],
                "subject": "Hi",
                "html": "<p>Hi</p>",
            })
        );
    }

    #[test]
    fn test_provider_message_prefers_json_message() {
        let body = r#"{"statusCode":422,"message":"Invalid `to` field.","name":"validation_error"}"#;
        assert_eq!(
            provider_message(reqwest::StatusCode::UNPROCESSABLE_ENTITY, body),
            "Invalid `to` field."
        );
    }

    #[test]
    fn test_provider_message_falls_back_to_status() {
        assert_eq!(
            provider_message(reqwest::StatusCode::BAD_GATEWAY, ""),
            "email provider returned 502 Bad Gateway"
        );
        assert_eq!(
            provider_message(reqwest::StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
    }

    #[test]
    fn test_endpoint() {
        let backend = ResendBackend::new(reqwest::Client::new(), "https://api.resend.com/", Secret::new("k"));
        assert_eq!(backend.endpoint(), "https://api.resend.com/emails");
    }

    #[tokio::test]
    async fn test_invalid_email_is_rejected_before_request() {
        let backend = ResendBackend::new(reqwest::Client::new(), "http://127.0.0.1:9", Secret::new("k"));
        let result = backend.send(Email::new().to("a@b.com")).await;
        assert!(matches!(result, Err(EmailError::NoSender)));
    }
}
