//! Outgoing email message

use serde::{Deserialize, Serialize};

use super::{EcardEmail, EmailError};

/// A message handed to an [`EmailSender`](super::EmailSender)
///
/// Gateways always send to a single recipient, but backends accept several.
///
/// ```rust
/// use ecard::email::Email;
///
/// let email = Email::new()
///     .to("friend@example.com")
///     .from("E-Cards <onboarding@resend.dev>")
///     .subject("You've received an e-card!")
///     .html("<p>Happy birthday!</p>");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// Recipient addresses
    pub to: Vec<String>,

    /// Sender identity, `Name <address>` or a bare address
    pub from: Option<String>,

    /// Subject line
    pub subject: Option<String>,

    /// Plain-text part
    pub text: Option<String>,

    /// HTML part
    pub html: Option<String>,
}

impl Email {
    /// Create a new empty email
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Email carrying both parts of a card body
    ///
    /// ```rust
    /// use ecard::email::{EcardEmail, Email};
    ///
    /// # fn example() -> Result<(), ecard::email::EmailError> {
    /// let email = Email::from_card(&EcardEmail::new("Hi!", "https://bucket/ecard-1.png"))?
    ///     .to("friend@example.com");
    /// assert!(email.html.is_some());
    /// assert!(email.text.is_some());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_card(card: &EcardEmail<'_>) -> Result<Self, EmailError> {
        Ok(Self::new()
            .html(&card.render_html()?)
            .text(&card.render_text()?))
    }

    /// Add a recipient
    #[must_use]
    pub fn to(mut self, address: &str) -> Self {
        self.to.push(address.to_string());
        self
    }

    /// Set the sender identity
    #[must_use]
    pub fn from(mut self, address: &str) -> Self {
        self.from = Some(address.to_string());
        self
    }

    /// Set the subject line
    #[must_use]
    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    /// Set the plain-text part
    #[must_use]
    pub fn text(mut self, body: &str) -> Self {
        self.text = Some(body.to_string());
        self
    }

    /// Set the HTML part
    #[must_use]
    pub fn html(mut self, body: &str) -> Self {
        self.html = Some(body.to_string());
        self
    }

    /// Check that the message can be handed to a provider
    ///
    /// Whitespace-only parts count as missing.
    pub fn validate(&self) -> Result<(), EmailError> {
        if self.to.is_empty() {
            return Err(EmailError::NoRecipients);
        }

        if self.from.is_none() {
            return Err(EmailError::NoSender);
        }

        if self.subject.is_none() {
            return Err(EmailError::NoSubject);
        }

        let has_body = |body: Option<&str>| body.is_some_and(|b| !b.trim().is_empty());
        if !has_body(self.text.as_deref()) && !has_body(self.html.as_deref()) {
            return Err(EmailError::NoContent);
        }

        Ok(())
    }
}
