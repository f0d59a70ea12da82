//! Console delivery for local development

use async_trait::async_trait;
use tracing::{debug, info};

use crate::email::{DeliveryReceipt, Email, EmailError, EmailSender};

/// Prints each card instead of delivering it
///
/// Returns a synthetic `console-<uuid>` receipt, so the full send path runs
/// without provider credentials.
#[derive(Debug, Clone, Default)]
pub struct ConsoleBackend {
    /// Also log the HTML part at debug level
    verbose: bool,
}

impl ConsoleBackend {
    /// Summary only
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Summary plus the HTML part in the debug log
    #[must_use]
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }
}

const WIDTH: usize = 56;
const BODY_PREVIEW_LINES: usize = 12;

fn truncate_line(line: &str) -> String {
    if line.chars().count() > WIDTH {
        format!("{}...", line.chars().take(WIDTH - 3).collect::<String>())
    } else {
        line.to_string()
    }
}

/// Boxed summary of a delivered card: headers, receipt id and the text part
fn summary(email: &Email, id: &str) -> String {
    let rule = "─".repeat(WIDTH + 2);
    let rows = [
        format!("To:      {}", email.to.join(", ")),
        format!("From:    {}", email.from.as_deref().unwrap_or_default()),
        format!("Subject: {}", email.subject.as_deref().unwrap_or_default()),
        format!("Id:      {id}"),
    ];
    let body: Vec<&str> = email
        .text
        .as_deref()
        .or(email.html.as_deref())
        .map(|body| body.lines().filter(|line| !line.trim().is_empty()).collect())
        .unwrap_or_default();

    let mut out = format!("┌{rule}┐\n");
    for row in &rows {
        out.push_str(&format!("│ {:<WIDTH$} │\n", truncate_line(row)));
    }
    out.push_str(&format!("├{rule}┤\n"));
    for line in body.iter().take(BODY_PREVIEW_LINES) {
        out.push_str(&format!("│ {:<WIDTH$} │\n", truncate_line(line.trim_end())));
    }
    if body.len() > BODY_PREVIEW_LINES {
        out.push_str(&format!("│ {:<WIDTH$} │\n", "..."));
    }
    out.push_str(&format!("└{rule}┘"));
    out
}

#[async_trait]
impl EmailSender for ConsoleBackend {
    async fn send(&self, email: Email) -> Result<DeliveryReceipt, EmailError> {
        email.validate()?;

        let id = format!("console-{}", uuid::Uuid::new_v4());
        info!(to = ?email.to, subject = ?email.subject, id = %id, "E-card delivered to console");

        if self.verbose {
            debug!(html = ?email.html, "Card HTML part");
        }
        println!("{}", summary(&email, &id));

        Ok(DeliveryReceipt::with_id(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_console_backend_returns_receipt() {
        let backend = ConsoleBackend::new();
        let email = Email::new()
            .to("friend@example.com")
            .from("E-Cards <onboarding@resend.dev>")
            .subject("Hi")
            .text("Hello");

        let receipt = backend.send(email).await.unwrap();
        assert!(receipt.id().unwrap().starts_with("console-"));
    }

    #[tokio::test]
    async fn test_console_backend_validates() {
        let backend = ConsoleBackend::verbose();
        let result = backend.send(Email::new().to("friend@example.com")).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_truncate_line_is_char_safe() {
        let long = "é".repeat(80);
        let truncated = truncate_line(&long);
        assert_eq!(truncated.chars().count(), WIDTH);
    }

    #[test]
    fn test_summary_prefers_text_part() {
        let email = Email::new()
            .to("friend@example.com")
            .subject("Hi")
            .html("<p>html</p>")
            .text("Happy birthday!\n\nhttps://bucket/ecards/ecard-1.png");

        let out = summary(&email, "console-1");
        assert!(out.contains("friend@example.com"));
        assert!(out.contains("console-1"));
        assert!(out.contains("Happy birthday!"));
        assert!(!out.contains("<p>"));
        assert_eq!(out.lines().count(), 9);
    }
}
