//! Email templates
//!
//! [`EcardEmail`] is the card body: a self-contained HTML document with
//! inline styles plus a plain-text alternative. Rendering is pure; the same
//! inputs always produce the same output.

use askama::Template;

use super::EmailError;

/// Text substituted for an empty message
pub const EMPTY_MESSAGE_PLACEHOLDER: &str = "No message provided.";

/// The e-card email body
///
/// An empty `image_url` omits the image block. Both fields are HTML-escaped.
///
/// # Examples
///
/// ```rust
/// use ecard::email::EcardEmail;
///
/// # fn example() -> Result<(), ecard::email::EmailError> {
/// let html = EcardEmail::new("", "https://bucket/ecard-1.png").render_html()?;
/// assert!(html.contains("No message provided."));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Template)]
#[template(path = "emails/ecard.html")]
pub struct EcardEmail<'a> {
    /// Message, already defaulted to the placeholder when blank
    pub message: &'a str,
    /// Public image URL, or empty for a card without an image
    pub image_url: &'a str,
}

#[derive(Template)]
#[template(path = "emails/ecard.txt")]
struct EcardEmailText<'a> {
    message: &'a str,
    image_url: &'a str,
}

impl<'a> EcardEmail<'a> {
    /// Creates the card body, substituting the placeholder for a blank message
    #[must_use]
    pub fn new(message: &'a str, image_url: &'a str) -> Self {
        let message = if message.trim().is_empty() {
            EMPTY_MESSAGE_PLACEHOLDER
        } else {
            message
        };
        Self {
            message,
            image_url: image_url.trim(),
        }
    }

    /// HTML document
    pub fn render_html(&self) -> Result<String, EmailError> {
        Ok(self.render()?)
    }

    /// Plain-text alternative
    pub fn render_text(&self) -> Result<String, EmailError> {
        let text = EcardEmailText {
            message: self.message,
            image_url: self.image_url,
        };
        Ok(text.render()?)
    }
}

/// Renders the card email as a complete HTML document
///
/// # Errors
///
/// Returns `EmailError::TemplateError` if the template fails to render
pub fn render_ecard_html(message: &str, image_url: &str) -> Result<String, EmailError> {
    EcardEmail::new(message, image_url).render_html()
}

/// Renders the plain-text alternative of the card email
///
/// # Errors
///
/// Returns `EmailError::TemplateError` if the template fails to render
pub fn render_ecard_text(message: &str, image_url: &str) -> Result<String, EmailError> {
    EcardEmail::new(message, image_url).render_text()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_render_embeds_message_and_image() {
        let html = render_ecard_html("Happy birthday!", "https://bucket/ecards/ecard-1.png").unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Happy birthday!"));
        assert!(html.contains("<img"));
        assert!(html.contains("ecard-1.png"));
        assert!(!html.contains("<link"));
    }

    #[test]
    fn test_empty_message_uses_placeholder() {
        let html = render_ecard_html("", "https://bucket/ecards/ecard-1.png").unwrap();
        assert!(html.contains(EMPTY_MESSAGE_PLACEHOLDER));

        let whitespace = render_ecard_html("   \n", "https://bucket/ecards/ecard-1.png").unwrap();
        assert!(whitespace.contains(EMPTY_MESSAGE_PLACEHOLDER));
    }

    #[test]
    fn test_message_is_escaped() {
        let html = render_ecard_html("<script>alert(1)</script>", "").unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_missing_image_omits_block() {
        let html = render_ecard_html("Hi", "").unwrap();
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_text_alternative() {
        let text = render_ecard_text("", "https://bucket/ecards/ecard-1.png").unwrap();
        assert!(text.contains(EMPTY_MESSAGE_PLACEHOLDER));
        assert!(text.contains("https://bucket/ecards/ecard-1.png"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_image_url_is_trimmed() {
        let card = EcardEmail::new("Hi", "  https://x/y.png\n");
        assert_eq!(card.image_url, "https://x/y.png");
        assert_eq!(card.message, "Hi");
    }

    proptest! {
        #[test]
        fn prop_render_is_deterministic(message in ".{0,200}", url in "https://[a-z]{1,12}/[a-z0-9-]{1,20}\\.png") {
            let first = render_ecard_html(&message, &url).unwrap();
            let second = render_ecard_html(&message, &url).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_blank_message_never_renders_empty(blank in "[ \t\n]{0,10}", url in "https://[a-z]{1,12}/[a-z]{1,8}\\.png") {
            let html = render_ecard_html(&blank, &url).unwrap();
            prop_assert!(html.contains(EMPTY_MESSAGE_PLACEHOLDER));
        }
    }
}
