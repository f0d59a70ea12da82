//! The card composition workflow
//!
//! [`Composer`] owns the form, the selected image and the busy flags, and
//! sequences the downstream calls:
//!
//! - `generate_image`: generate → show the provider URL → upload → show the
//!   durable URL
//! - `submit`: validate → upload a pending image → render → persist → dispatch
//!   → reset
//!
//! Nothing is retried. Every failure ends the current call chain with a
//! [`Notice`] and an outcome value describing where it stopped.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::client::{EmailDispatch, ImageGeneration};
use super::flags::{Busy, BusyFlags};
use super::form::{FormEvent, FormState};
use super::image::{ImagePolicy, ImageReference};
use crate::email::{render_ecard_html, DeliveryReceipt};
use crate::gateway::send::SendEcardRequest;
use crate::records::{CardRepository, ECardRecord};
use crate::storage::{BinaryImage, ImageSource, ImageUpload, StorageResult};

/// User-facing notice shown for a generic send failure
pub const SEND_FAILED: &str = "Failed to send e-card. Please try again.";

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// The action completed
    Success,
    /// Required input is missing
    Validation,
    /// A downstream call failed
    Error,
}

/// A transient user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Headline
    pub title: String,
    /// Optional second line
    pub description: Option<String>,
}

impl Notice {
    fn new(level: NoticeLevel, title: &str, description: Option<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            description,
        }
    }

    fn success(title: &str, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, Some(description.into()))
    }

    fn validation(title: &str) -> Self {
        Self::new(NoticeLevel::Validation, title, None)
    }

    fn error(title: &str, description: Option<String>) -> Self {
        Self::new(NoticeLevel::Error, title, description)
    }
}

/// A card that was persisted and delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCard {
    /// The persisted record
    pub record: ECardRecord,
    /// The provider's delivery receipt
    pub receipt: DeliveryReceipt,
}

/// Events for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerEvent {
    /// Show this image in the preview
    Preview(ImageReference),
    /// Clear the preview
    PreviewCleared,
    /// Show a notice
    Notice(Notice),
    /// A card went out
    Sent(SentCard),
}

/// Result of `generate_image`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// No prompt; nothing was called
    Invalid,
    /// A generation is already running
    Busy,
    /// The gateway failed; state is unchanged
    Failed,
    /// Generated, but storing it failed; the provider URL stays active
    Ephemeral(String),
    /// Generated and stored
    Durable(String),
}

/// Result of `submit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Required input missing; nothing was called
    Invalid,
    /// A submission is already running
    Busy,
    /// The pending image could not be stored; nothing was persisted or sent
    UploadFailed,
    /// The email body could not be rendered; nothing was persisted or sent
    RenderFailed,
    /// The record could not be saved; no email was sent
    PersistFailed,
    /// The record was saved but the email did not go out
    DispatchFailed {
        /// The record that stays persisted
        record: ECardRecord,
    },
    /// Persisted and delivered
    Sent(SentCard),
}

/// Downstream collaborators of a composer
#[derive(Clone)]
pub struct ComposerServices {
    /// Image generation gateway
    pub generator: Arc<dyn ImageGeneration>,
    /// Storage uploader
    pub uploader: Arc<dyn ImageUpload>,
    /// Card record store
    pub cards: Arc<dyn CardRepository>,
    /// Email dispatch gateway
    pub dispatcher: Arc<dyn EmailDispatch>,
}

impl std::fmt::Debug for ComposerServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposerServices").finish_non_exhaustive()
    }
}

/// One composition session
///
/// ```rust,no_run
/// use ecard::composer::{Composer, ComposerServices, FormEvent, ImagePolicy};
///
/// # async fn example(services: ComposerServices) {
/// let (mut composer, mut events) = Composer::new(services, ImagePolicy::Required);
/// composer.dispatch(FormEvent::ImagePromptChanged("A cat in space".into()));
/// composer.dispatch(FormEvent::RecipientEmailChanged("friend@example.com".into()));
///
/// composer.generate_image().await;
/// composer.submit().await;
///
/// while let Ok(event) = events.try_recv() {
///     println!("{event:?}");
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct Composer {
    form: FormState,
    local_image: Option<BinaryImage>,
    active_image: Option<ImageReference>,
    flags: BusyFlags,
    policy: ImagePolicy,
    services: ComposerServices,
    events: mpsc::UnboundedSender<ComposerEvent>,
}

impl Composer {
    /// Start a session; the receiver yields [`ComposerEvent`]s
    #[must_use]
    pub fn new(
        services: ComposerServices,
        policy: ImagePolicy,
    ) -> (Self, mpsc::UnboundedReceiver<ComposerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let composer = Self {
            form: FormState::default(),
            local_image: None,
            active_image: None,
            flags: BusyFlags::new(),
            policy,
            services,
            events,
        };
        (composer, receiver)
    }

    /// Use externally owned busy flags
    #[must_use]
    pub fn with_flags(mut self, flags: BusyFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Current form
    #[must_use]
    pub const fn form(&self) -> &FormState {
        &self.form
    }

    /// Current active image, if any
    #[must_use]
    pub const fn active_image(&self) -> Option<&ImageReference> {
        self.active_image.as_ref()
    }

    /// Locally selected image waiting to be stored
    #[must_use]
    pub const fn local_image(&self) -> Option<&BinaryImage> {
        self.local_image.as_ref()
    }

    /// Shared busy flags
    #[must_use]
    pub fn flags(&self) -> BusyFlags {
        self.flags.clone()
    }

    /// Apply a form update
    pub fn dispatch(&mut self, event: FormEvent) {
        self.form = std::mem::take(&mut self.form).apply(event);
    }

    /// Select a local image
    ///
    /// Replaces any previously active image, generated or uploaded.
    pub fn select_image(&mut self, image: BinaryImage) {
        self.local_image = Some(image);
        if self.active_image.take().is_some() {
            self.emit(ComposerEvent::PreviewCleared);
        }
    }

    fn emit(&self, event: ComposerEvent) {
        // A dropped receiver only means nobody is watching.
        let _ = self.events.send(event);
    }

    fn notify(&self, notice: Notice) {
        self.emit(ComposerEvent::Notice(notice));
    }

    fn set_active(&mut self, image: ImageReference) {
        self.active_image = Some(image.clone());
        self.emit(ComposerEvent::Preview(image));
    }

    async fn upload(&self, source: ImageSource) -> StorageResult<String> {
        let _uploading = self.flags.enter(Busy::Uploading);
        self.services.uploader.upload(source).await
    }

    /// Generate an image from the prompt and store it
    pub async fn generate_image(&mut self) -> GenerateOutcome {
        let prompt = self.form.image_prompt.trim().to_string();
        if prompt.is_empty() {
            self.notify(Notice::validation("Please enter an image prompt"));
            return GenerateOutcome::Invalid;
        }

        let Some(_generating) = self.flags.enter(Busy::Generating) else {
            return GenerateOutcome::Busy;
        };

        let provider_url = match self.services.generator.generate(&prompt).await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Image generation failed");
                self.notify(Notice::error("Failed to generate image", Some(e.to_string())));
                return GenerateOutcome::Failed;
            }
        };

        self.set_active(ImageReference::Ephemeral(provider_url.clone()));

        match self.upload(ImageSource::Remote(provider_url.clone())).await {
            Ok(durable_url) => {
                self.local_image = None;
                self.set_active(ImageReference::Durable(durable_url.clone()));
                self.notify(Notice::success(
                    "Image generated",
                    "Your image has been generated and saved.",
                ));
                info!(url = %durable_url, "Generated image stored");
                GenerateOutcome::Durable(durable_url)
            }
            Err(e) => {
                warn!(error = %e, url = %provider_url, "Generated image could not be stored");
                self.notify(Notice::error(
                    "Image generated but could not be saved",
                    Some("The preview uses a temporary link that may expire.".to_string()),
                ));
                GenerateOutcome::Ephemeral(provider_url)
            }
        }
    }

    /// Store whichever image is pending and return the durable URL to persist
    async fn resolve_image(&mut self) -> StorageResult<Option<String>> {
        if let Some(ImageReference::Durable(url)) = &self.active_image {
            return Ok(Some(url.clone()));
        }

        let source = match (&self.local_image, &self.active_image) {
            (Some(image), _) => ImageSource::Binary(image.clone()),
            (None, Some(ImageReference::Ephemeral(url))) => ImageSource::Remote(url.clone()),
            _ => return Ok(None),
        };

        let url = self.upload(source).await?;
        self.local_image = None;
        self.set_active(ImageReference::Durable(url.clone()));
        Ok(Some(url))
    }

    fn reset(&mut self) {
        self.dispatch(FormEvent::Reset);
        self.local_image = None;
        self.active_image = None;
        self.emit(ComposerEvent::PreviewCleared);
    }

    fn send_failed(&self, stage: &str, detail: &str) {
        error!(stage, error = %detail, "E-card submission failed");
        self.notify(Notice::error(SEND_FAILED, None));
    }

    /// Persist the card and send it
    pub async fn submit(&mut self) -> SubmitOutcome {
        let recipient = self.form.recipient_email.trim().to_string();
        if recipient.is_empty() {
            self.notify(Notice::validation("Please enter a recipient email"));
            return SubmitOutcome::Invalid;
        }

        let has_image = self.local_image.is_some() || self.active_image.is_some();
        if self.policy == ImagePolicy::Required && !has_image {
            self.notify(Notice::validation("Please upload or generate an image"));
            return SubmitOutcome::Invalid;
        }

        let flags = self.flags.clone();
        let Some(_sending) = flags.enter(Busy::Sending) else {
            return SubmitOutcome::Busy;
        };

        let image_url = match self.resolve_image().await {
            Ok(url) => url,
            Err(e) => {
                self.send_failed("upload", &e.to_string());
                return SubmitOutcome::UploadFailed;
            }
        };

        let message = self.form.message.clone();
        let html = match render_ecard_html(&message, image_url.as_deref().unwrap_or_default()) {
            Ok(html) => html,
            Err(e) => {
                self.send_failed("render", &e.to_string());
                return SubmitOutcome::RenderFailed;
            }
        };

        let record = ECardRecord {
            message: message.clone(),
            recipient_email: recipient.clone(),
            image_url: image_url.clone(),
        };
        if let Err(e) = self.services.cards.insert(&record).await {
            self.send_failed("persist", &e.to_string());
            return SubmitOutcome::PersistFailed;
        }

        let request = SendEcardRequest {
            recipient_email: recipient.clone(),
            message,
            image_url: image_url.unwrap_or_default(),
            email_html: Some(html),
        };
        let receipt = match self.services.dispatcher.dispatch(&request).await {
            Ok(receipt) => receipt,
            Err(e) => {
                self.send_failed("dispatch", &e.to_string());
                return SubmitOutcome::DispatchFailed { record };
            }
        };

        info!(recipient = %recipient, id = ?receipt.id(), "E-card sent");
        self.notify(Notice::success(
            "E-card sent!",
            format!("Your e-card has been sent to {recipient}"),
        ));
        self.reset();

        let card = SentCard { record, receipt };
        self.emit(ComposerEvent::Sent(card.clone()));
        SubmitOutcome::Sent(card)
    }
}
