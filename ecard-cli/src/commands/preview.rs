//! Email preview command

use anyhow::Result;
use ecard::email::{render_ecard_html, render_ecard_text};

/// Print the card email exactly as it would be sent
pub struct PreviewCommand {
    message: String,
    image_url: String,
    text: bool,
}

impl PreviewCommand {
    /// Create a new command instance
    pub const fn new(message: String, image_url: String, text: bool) -> Self {
        Self {
            message,
            image_url,
            text,
        }
    }

    /// Render the requested part
    pub fn render(&self) -> Result<String> {
        let body = if self.text {
            render_ecard_text(&self.message, &self.image_url)?
        } else {
            render_ecard_html(&self.message, &self.image_url)?
        };
        Ok(body)
    }

    /// Execute the command
    pub fn execute(&self) -> Result<()> {
        println!("{}", self.render()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_preview_includes_image_url() {
        let cmd = PreviewCommand::new(
            "Happy birthday!".into(),
            "https://bucket/ecards/ecard-1.png".into(),
            true,
        );
        let body = cmd.render().unwrap();
        assert!(body.contains("Happy birthday!"));
        assert!(body.contains("https://bucket/ecards/ecard-1.png"));
    }

    #[test]
    fn test_html_preview_uses_placeholder() {
        let cmd = PreviewCommand::new(String::new(), String::new(), false);
        let body = cmd.render().unwrap();
        assert!(body.contains("No message provided."));
        assert!(!body.contains("<img"));
    }
}
