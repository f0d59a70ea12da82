//! Email sender trait abstraction

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Email, EmailError};

/// Delivery receipt returned by a backend
///
/// Holds the provider's response body verbatim so the dispatch gateway can
/// hand it back to its caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryReceipt(pub serde_json::Value);

impl DeliveryReceipt {
    /// Build a receipt carrying only a message id
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self(serde_json::json!({ "id": id.into() }))
    }

    /// Provider message id, if the receipt carries one
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(serde_json::Value::as_str)
    }

    /// Raw receipt body
    #[must_use]
    pub const fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Trait for sending emails
///
/// Implemented by all email backends (Resend, SMTP, console).
///
/// # Examples
///
/// ```rust
/// use ecard::email::{ConsoleBackend, Email, EmailSender};
///
/// # async fn example() -> Result<(), ecard::email::EmailError> {
/// let sender = ConsoleBackend::new();
///
/// let email = Email::new()
///     .to("friend@example.com")
///     .from("E-Cards <onboarding@resend.dev>")
///     .subject("Hello!")
///     .text("Hello, World!");
///
/// let receipt = sender.send(email).await?;
/// assert!(receipt.id().is_some());
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send an email
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the email is invalid or the backend fails to
    /// deliver it
    async fn send(&self, email: Email) -> Result<DeliveryReceipt, EmailError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_id() {
        let receipt = DeliveryReceipt(serde_json::json!({ "id": "49a3999c-0ce1-4ea6-ab68-afcd6dc2e794" }));
        assert_eq!(receipt.id(), Some("49a3999c-0ce1-4ea6-ab68-afcd6dc2e794"));

        let empty = DeliveryReceipt(serde_json::json!({}));
        assert_eq!(empty.id(), None);
    }

    #[test]
    fn test_receipt_serializes_verbatim() {
        let body = serde_json::json!({ "id": "abc", "extra": [1, 2] });
        let receipt = DeliveryReceipt(body.clone());
        assert_eq!(serde_json::to_value(&receipt).unwrap(), body);
    }
}
