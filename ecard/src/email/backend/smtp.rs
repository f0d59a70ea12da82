//! SMTP backend for sending emails
//!
//! Uses the `lettre` crate to send emails via SMTP servers.

use async_trait::async_trait;
use lettre::{
    message::{header, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

use crate::config::SmtpSettings;
use crate::email::{DeliveryReceipt, Email, EmailError, EmailSender};

/// SMTP email backend
///
/// The transport is built once and reused for every message.
pub struct SmtpBackend {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl std::fmt::Debug for SmtpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpBackend")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl SmtpBackend {
    /// Create an SMTP backend from settings
    ///
    /// # Errors
    ///
    /// Returns `EmailError::ConfigError` if no host is configured, and
    /// `EmailError::SmtpError` if the TLS parameters cannot be built
    pub fn from_settings(settings: &SmtpSettings) -> Result<Self, EmailError> {
        let host = settings
            .host
            .clone()
            .filter(|host| !host.trim().is_empty())
            .ok_or_else(|| EmailError::config("email.smtp.host is not set"))?;

        let mut builder = if settings.use_tls {
            let tls_parameters = TlsParameters::new(host.clone())
                .map_err(|e| EmailError::smtp(format!("TLS parameters error: {e}")))?;

            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
                .map_err(|e| EmailError::smtp(e.to_string()))?
                .tls(Tls::Required(tls_parameters))
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&host)
        };

        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                password.expose().to_string(),
            ));
        }

        Ok(Self {
            transport: builder.port(settings.port).build(),
            host,
        })
    }

    /// Build lettre Message from Email
    fn build_message(email: &Email) -> Result<Message, EmailError> {
        email.validate()?;

        let from_addr = email.from.as_ref().ok_or(EmailError::NoSender)?;
        let from: Mailbox = from_addr
            .parse()
            .map_err(|_| EmailError::InvalidAddress(from_addr.clone()))?;

        let mut builder = Message::builder().from(from);

        for to_addr in &email.to {
            let to: Mailbox = to_addr
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to_addr.clone()))?;
            builder = builder.to(to);
        }

        let subject = email.subject.as_ref().ok_or(EmailError::NoSubject)?;
        builder = builder.subject(subject);

        let message = match (&email.html, &email.text) {
            (Some(html), Some(text)) => builder
                .multipart(
                    MultiPart::alternative()
                        .singlepart(
                            SinglePart::builder()
                                .header(header::ContentType::TEXT_PLAIN)
                                .body(text.clone()),
                        )
                        .singlepart(
                            SinglePart::builder()
                                .header(header::ContentType::TEXT_HTML)
                                .body(html.clone()),
                        ),
                )
                .map_err(|e| EmailError::smtp(e.to_string()))?,
            (Some(html), None) => builder
                .header(header::ContentType::TEXT_HTML)
                .body(html.clone())
                .map_err(|e| EmailError::smtp(e.to_string()))?,
            (None, Some(text)) => builder
                .header(header::ContentType::TEXT_PLAIN)
                .body(text.clone())
                .map_err(|e| EmailError::smtp(e.to_string()))?,
            (None, None) => return Err(EmailError::NoContent),
        };

        Ok(message)
    }
}

#[async_trait]
impl EmailSender for SmtpBackend {
    async fn send(&self, email: Email) -> Result<DeliveryReceipt, EmailError> {
        let message = Self::build_message(&email)?;
        let message_id = message
            .headers()
            .get_raw("Message-ID")
            .map(str::to_string);

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| EmailError::smtp(e.to_string()))?;

        let receipt = DeliveryReceipt(serde_json::json!({
            "id": message_id,
            "status": response.code().to_string(),
        }));
        info!(host = %self.host, to = ?email.to, "Email sent via SMTP");
        Ok(receipt)
    }
}
