//! Recording email sender

use parking_lot::Mutex;
use std::sync::Arc;

use async_trait::async_trait;

use crate::email::{DeliveryReceipt, Email, EmailError, EmailSender};

/// Email sender that captures messages instead of delivering them
///
/// Clones share the captured list.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmailSender {
    sent: Arc<Mutex<Vec<Email>>>,
    failure: Option<String>,
}

impl RecordingEmailSender {
    /// Create a sender that accepts everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sender that rejects every email with `message`
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent: Arc::default(),
            failure: Some(message.into()),
        }
    }

    /// Number of emails accepted
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// All accepted emails
    #[must_use]
    pub fn sent_emails(&self) -> Vec<Email> {
        self.sent.lock().clone()
    }

    /// Most recently accepted email
    #[must_use]
    pub fn last_email(&self) -> Option<Email> {
        self.sent.lock().last().cloned()
    }

    /// Whether any accepted email went to `address`
    #[must_use]
    pub fn was_sent_to(&self, address: &str) -> bool {
        self.sent
            .lock()
            .iter()
            .any(|email| email.to.iter().any(|to| to == address))
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, email: Email) -> Result<DeliveryReceipt, EmailError> {
        if let Some(message) = &self.failure {
            return Err(EmailError::provider(message.clone()));
        }
        email.validate()?;

        let mut sent = self.sent.lock();
        sent.push(email);
        Ok(DeliveryReceipt::with_id(format!("test-{}", sent.len())))
    }
}
