//! Form state and its update events

use serde::{Deserialize, Serialize};

/// The composer's form fields
///
/// Values are never mutated in place; every change is a [`FormEvent`] folded
/// into a new state with [`FormState::apply`].
///
/// ```rust
/// use ecard::composer::{FormEvent, FormState};
///
/// let form = FormState::default()
///     .apply(FormEvent::MessageChanged("Happy birthday!".into()))
///     .apply(FormEvent::RecipientEmailChanged("friend@example.com".into()));
/// assert_eq!(form.message, "Happy birthday!");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    /// Optional text prompt for image generation
    pub image_prompt: String,
    /// Free-text message, may be empty
    pub message: String,
    /// Recipient address, required at submission
    pub recipient_email: String,
}

/// A single field update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// The image prompt changed
    ImagePromptChanged(String),
    /// The message changed
    MessageChanged(String),
    /// The recipient address changed
    RecipientEmailChanged(String),
    /// Clear every field
    Reset,
}

impl FormState {
    /// Fold one event into the state
    #[must_use]
    pub fn apply(self, event: FormEvent) -> Self {
        match event {
            FormEvent::ImagePromptChanged(image_prompt) => Self {
                image_prompt,
                ..self
            },
            FormEvent::MessageChanged(message) => Self { message, ..self },
            FormEvent::RecipientEmailChanged(recipient_email) => Self {
                recipient_email,
                ..self
            },
            FormEvent::Reset => Self::default(),
        }
    }

    /// Fold a sequence of events into the state
    #[must_use]
    pub fn apply_all(self, events: impl IntoIterator<Item = FormEvent>) -> Self {
        events.into_iter().fold(self, Self::apply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_event_touches_one_field() {
        let form = FormState::default().apply(FormEvent::ImagePromptChanged("A cat".into()));
        assert_eq!(form.image_prompt, "A cat");
        assert!(form.message.is_empty());
        assert!(form.recipient_email.is_empty());

        let form = form.apply(FormEvent::RecipientEmailChanged("a@b.com".into()));
        assert_eq!(form.image_prompt, "A cat");
        assert_eq!(form.recipient_email, "a@b.com");
    }

    #[test]
    fn test_reset_clears_everything() {
        let form = FormState::default().apply_all([
            FormEvent::ImagePromptChanged("A cat".into()),
            FormEvent::MessageChanged("Hi".into()),
            FormEvent::Reset,
        ]);
        assert_eq!(form, FormState::default());
    }

    #[test]
    fn test_later_events_win() {
        let form = FormState::default().apply_all([
            FormEvent::MessageChanged("first".into()),
            FormEvent::MessageChanged("second".into()),
        ]);
        assert_eq!(form.message, "second");
    }
}
