//! Email dispatch gateway
//!
//! `POST { recipientEmail, message, imageUrl, emailHtml? }` → the provider's
//! delivery receipt, verbatim. Without `emailHtml` the card template is
//! rendered here.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::EmailBackendKind;
use crate::email::{render_ecard_html, render_ecard_text, DeliveryReceipt, Email, EmailError};
use crate::error::GatewayError;
use crate::observability::log_excerpt;
use crate::state::GatewayState;

/// Request body
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendEcardRequest {
    /// Recipient address
    #[serde(default)]
    #[validate(email(message = "Invalid recipient email"))]
    pub recipient_email: String,

    /// Card message, may be empty
    #[serde(default)]
    pub message: String,

    /// Public image URL, may be empty for a card without an image
    #[serde(default)]
    pub image_url: String,

    /// Pre-rendered HTML body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_html: Option<String>,
}

fn missing_sender_detail(backend: EmailBackendKind) -> &'static str {
    match backend {
        EmailBackendKind::Resend => "RESEND_API_KEY is not set",
        EmailBackendKind::Smtp => "email.smtp.host is not set",
        EmailBackendKind::Console => "console backend unavailable",
    }
}

/// Handle `POST /functions/v1/send-ecard`
pub async fn send_ecard(
    State(state): State<GatewayState>,
    payload: Result<Json<SendEcardRequest>, JsonRejection>,
) -> Result<Json<DeliveryReceipt>, GatewayError> {
    let settings = &state.config().email;
    let sender = state.email_sender().ok_or_else(|| {
        GatewayError::configuration(
            "Email provider is not configured",
            missing_sender_detail(settings.backend),
        )
    })?;

    let Json(request) =
        payload.map_err(|rejection| GatewayError::bad_request(rejection.body_text()))?;

    tracing::info!(
        recipient = %request.recipient_email,
        message = %log_excerpt(&request.message, 50),
        image_url = %request.image_url,
        has_html = request.email_html.is_some(),
        "Sending e-card"
    );

    if request.recipient_email.trim().is_empty() {
        return Err(GatewayError::bad_request("Missing required field: recipientEmail"));
    }
    if request.validate().is_err() {
        return Err(GatewayError::bad_request("Invalid recipient email"));
    }

    // The template text part only accompanies the template HTML.
    let (html, text) = match request.email_html {
        Some(html) => (html, None),
        None => {
            let html = render_ecard_html(&request.message, &request.image_url)
                .map_err(|e| GatewayError::upstream(e.to_string(), None))?;
            let text = render_ecard_text(&request.message, &request.image_url)
                .map_err(|e| GatewayError::upstream(e.to_string(), None))?;
            (html, Some(text))
        }
    };
    if html.trim().is_empty() {
        return Err(GatewayError::upstream(EmailError::NoContent.to_string(), None));
    }

    let mut email = Email::new()
        .to(request.recipient_email.trim())
        .from(&settings.from)
        .subject(&settings.subject)
        .html(&html);
    if let Some(text) = &text {
        email = email.text(text);
    }

    let receipt = sender
        .send(email)
        .await
        .map_err(|e| GatewayError::upstream(e.to_string(), None))?;

    tracing::info!(id = ?receipt.id(), "E-card sent");
    Ok(Json(receipt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EcardConfig;
    use crate::email::MockEmailSender;
    use axum::http::StatusCode;
    use std::sync::Arc;

    fn state_with(sender: MockEmailSender) -> GatewayState {
        GatewayState::new(EcardConfig::default(), None, Some(Arc::new(sender)))
    }

    fn request(recipient: &str, message: &str, html: Option<&str>) -> SendEcardRequest {
        SendEcardRequest {
            recipient_email: recipient.to_string(),
            message: message.to_string(),
            image_url: "https://bucket/ecards/ecard-1.png".to_string(),
            email_html: html.map(str::to_string),
        }
    }

    #[test]
    fn test_request_uses_camel_case() {
        let request: SendEcardRequest = serde_json::from_value(serde_json::json!({
            "recipientEmail": "a@b.com",
            "message": "Hi",
            "imageUrl": "https://bucket/x.png",
            "emailHtml": "<p>Hi</p>",
        }))
        .unwrap();
        assert_eq!(request.recipient_email, "a@b.com");
        assert_eq!(request.email_html.as_deref(), Some("<p>Hi</p>"));
    }

    #[tokio::test]
    async fn test_renders_template_when_html_missing() {
        let mut sender = MockEmailSender::new();
        sender
            .expect_send()
            .withf(|email| {
                email.to == vec!["a@b.com".to_string()]
                    && email.from.as_deref() == Some("E-Cards <onboarding@resend.dev>")
                    && email
                        .html
                        .as_deref()
                        .is_some_and(|html| html.contains("No message provided."))
                    && email.text.is_some()
            })
            .times(1)
            .returning(|_| Ok(DeliveryReceipt::with_id("re_1")));

        let Json(receipt) = send_ecard(State(state_with(sender)), Ok(Json(request("a@b.com", "", None))))
            .await
            .unwrap();
        assert_eq!(receipt.id(), Some("re_1"));
    }

    #[tokio::test]
    async fn test_precomputed_html_is_forwarded_verbatim() {
        let mut sender = MockEmailSender::new();
        sender
            .expect_send()
            .withf(|email| email.html.as_deref() == Some("<p>custom</p>") && email.text.is_none())
            .times(1)
            .returning(|_| Ok(DeliveryReceipt::with_id("re_2")));

        let result = send_ecard(
            State(state_with(sender)),
            Ok(Json(request("a@b.com", "Hi", Some("<p>custom</p>")))),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_blank_html_is_rejected() {
        let mut sender = MockEmailSender::new();
        sender.expect_send().never();

        let error = send_ecard(
            State(state_with(sender)),
            Ok(Json(request("a@b.com", "Hi", Some("  ")))),
        )
        .await
        .unwrap_err();
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.to_string().contains("Email HTML content is required"));
    }

    #[tokio::test]
    async fn test_missing_recipient_is_bad_request() {
        let mut sender = MockEmailSender::new();
        sender.expect_send().never();

        let error = send_ecard(State(state_with(sender)), Ok(Json(request("", "Hi", None))))
            .await
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_provider_error_message_is_surfaced() {
        let mut sender = MockEmailSender::new();
        sender
            .expect_send()
            .returning(|_| Err(EmailError::provider("Invalid `to` field.")));

        let error = send_ecard(State(state_with(sender)), Ok(Json(request("a@b.com", "Hi", None))))
            .await
            .unwrap_err();
        match error {
            GatewayError::Upstream { summary, .. } => assert_eq!(summary, "Invalid `to` field."),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_sender() {
        let state = GatewayState::new(EcardConfig::default(), None, None);
        let error = send_ecard(State(state), Ok(Json(request("a@b.com", "Hi", None))))
            .await
            .unwrap_err();
        assert!(matches!(error, GatewayError::Configuration { .. }));
    }
}
