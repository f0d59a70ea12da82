//! Card email rendering and delivery
//!
//! - [`EcardEmail`] renders the card body (HTML plus a plain-text alternative)
//! - [`EmailSender`] is implemented by every delivery backend:
//!   [`ResendBackend`] (production), [`SmtpBackend`] and [`ConsoleBackend`]
//!   (development)
//!
//! # Examples
//!
//! ```rust
//! use ecard::email::{ConsoleBackend, EcardEmail, Email, EmailSender};
//!
//! # async fn example() -> Result<(), ecard::email::EmailError> {
//! let email = Email::from_card(&EcardEmail::new("Happy birthday!", "https://bucket/ecard-1.png"))?
//!     .to("friend@example.com")
//!     .from("E-Cards <onboarding@resend.dev>")
//!     .subject("You've received an e-card!");
//!
//! ConsoleBackend::new().send(email).await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod builder;
mod error;
mod sender;
mod template;

pub use backend::{console::ConsoleBackend, resend::ResendBackend, smtp::SmtpBackend};
pub use builder::Email;
pub use error::EmailError;
pub use sender::{DeliveryReceipt, EmailSender};
pub use template::{
    render_ecard_html, render_ecard_text, EcardEmail, EMPTY_MESSAGE_PLACEHOLDER,
};

#[cfg(test)]
pub use sender::MockEmailSender;

use crate::config::{EmailBackendKind, EmailSettings, ProviderSettings};
use std::sync::Arc;

/// Builds the backend selected by `email.backend`
///
/// Returns `Ok(None)` when the selected backend lacks its credential; the
/// dispatch gateway reports that as a configuration failure per request.
///
/// # Errors
///
/// Returns `EmailError` if a configured backend cannot be constructed
pub fn sender_from_settings(
    email: &EmailSettings,
    providers: &ProviderSettings,
) -> Result<Option<Arc<dyn EmailSender>>, EmailError> {
    let sender: Option<Arc<dyn EmailSender>> = match email.backend {
        EmailBackendKind::Resend => match providers.resend_api_key.clone() {
            Some(key) if !key.is_empty() => {
                let http = reqwest::Client::builder()
                    .timeout(providers.timeout())
                    .build()
                    .map_err(|e| EmailError::config(e.to_string()))?;
                Some(Arc::new(ResendBackend::new(
                    http,
                    providers.resend_base_url.clone(),
                    key,
                )))
            }
            _ => None,
        },
        EmailBackendKind::Smtp => {
            if email.smtp.host.as_deref().is_some_and(|h| !h.trim().is_empty()) {
                Some(Arc::new(SmtpBackend::from_settings(&email.smtp)?))
            } else {
                None
            }
        }
        EmailBackendKind::Console => Some(Arc::new(ConsoleBackend::new())),
    };
    Ok(sender)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Secret;

    #[test]
    fn test_resend_without_key_is_unconfigured() {
        let sender =
            sender_from_settings(&EmailSettings::default(), &ProviderSettings::default()).unwrap();
        assert!(sender.is_none());
    }

    #[test]
    fn test_resend_with_key() {
        let providers = ProviderSettings {
            resend_api_key: Some(Secret::new("re_123")),
            ..ProviderSettings::default()
        };
        let sender = sender_from_settings(&EmailSettings::default(), &providers).unwrap();
        assert!(sender.is_some());
    }

    #[test]
    fn test_console_needs_no_credentials() {
        let email = EmailSettings {
            backend: EmailBackendKind::Console,
            ..EmailSettings::default()
        };
        let sender = sender_from_settings(&email, &ProviderSettings::default()).unwrap();
        assert!(sender.is_some());
    }
}
