//! Email error types

use thiserror::Error;

/// Errors that can occur when rendering or sending emails
#[derive(Debug, Error)]
pub enum EmailError {
    /// Email has no recipients
    #[error("email must have at least one recipient")]
    NoRecipients,

    /// Email has no sender
    #[error("email must have a from address")]
    NoSender,

    /// Email has no subject
    #[error("email must have a subject")]
    NoSubject,

    /// Email has no body content
    #[error("Email HTML content is required")]
    NoContent,

    /// Invalid email address format
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error
    #[error("failed to render email template: {0}")]
    TemplateError(#[from] askama::Error),

    /// The HTTP email provider rejected or failed the request
    #[error("{0}")]
    ProviderError(String),

    /// SMTP transport error
    #[error("SMTP error: {0}")]
    SmtpError(String),

    /// Email configuration error
    #[error("email configuration error: {0}")]
    ConfigError(String),
}

impl EmailError {
    /// Create a provider error from the provider's message
    #[must_use]
    pub fn provider<T: Into<String>>(msg: T) -> Self {
        Self::ProviderError(msg.into())
    }

    /// Create an SMTP error from a string message
    #[must_use]
    pub fn smtp<T: Into<String>>(msg: T) -> Self {
        Self::SmtpError(msg.into())
    }

    /// Create a configuration error from a string message
    #[must_use]
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::ConfigError(msg.into())
    }
}
