//! Gateway state
//!
//! Holds the explicit provider handles the two gateways call through. A
//! provider that is not configured is `None`; the gateway reports that as a
//! configuration failure when a request needs it.

use crate::config::EcardConfig;
use crate::email::{sender_from_settings, EmailSender};
use crate::imagegen::{ImageModel, ReplicateModel};
use std::sync::Arc;

/// Shared state for the gateway router
///
/// # Example
///
/// ```rust
/// use ecard::{config::EcardConfig, state::GatewayState};
///
/// # fn example() -> anyhow::Result<()> {
/// let state = GatewayState::from_config(EcardConfig::default())?;
/// assert!(state.image_model().is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GatewayState {
    /// Application configuration
    config: Arc<EcardConfig>,

    /// Text-to-image model, when a token is configured
    image_model: Option<Arc<dyn ImageModel>>,

    /// Email backend, when its credentials are configured
    email_sender: Option<Arc<dyn EmailSender>>,
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("config", &self.config)
            .field("image_model", &self.image_model.is_some())
            .field("email_sender", &self.email_sender.is_some())
            .finish()
    }
}

impl GatewayState {
    /// Create state with explicit providers
    #[must_use]
    pub fn new(
        config: EcardConfig,
        image_model: Option<Arc<dyn ImageModel>>,
        email_sender: Option<Arc<dyn EmailSender>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            image_model,
            email_sender,
        }
    }

    /// Build providers from configuration
    ///
    /// Missing credentials leave the respective provider unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured provider client cannot be constructed
    pub fn from_config(config: EcardConfig) -> anyhow::Result<Self> {
        let image_model = ReplicateModel::from_settings(&config.providers)?
            .map(|model| Arc::new(model) as Arc<dyn ImageModel>);
        let email_sender = sender_from_settings(&config.email, &config.providers)?;

        if image_model.is_none() {
            tracing::warn!("REPLICATE_API_TOKEN is not set; image generation requests will fail");
        }
        if email_sender.is_none() {
            tracing::warn!(backend = ?config.email.backend, "Email backend is not configured; send requests will fail");
        }

        Ok(Self::new(config, image_model, email_sender))
    }

    /// Replace the image model
    #[must_use]
    pub fn with_image_model(mut self, model: Arc<dyn ImageModel>) -> Self {
        self.image_model = Some(model);
        self
    }

    /// Replace the email sender
    #[must_use]
    pub fn with_email_sender(mut self, sender: Arc<dyn EmailSender>) -> Self {
        self.email_sender = Some(sender);
        self
    }

    /// Get configuration reference
    #[must_use]
    pub fn config(&self) -> &EcardConfig {
        &self.config
    }

    /// Configured image model
    #[must_use]
    pub fn image_model(&self) -> Option<&Arc<dyn ImageModel>> {
        self.image_model.as_ref()
    }

    /// Configured email sender
    #[must_use]
    pub fn email_sender(&self) -> Option<&Arc<dyn EmailSender>> {
        self.email_sender.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmailBackendKind, Secret};
    use crate::email::ConsoleBackend;

    #[test]
    fn test_unconfigured_providers() {
        let state = GatewayState::from_config(EcardConfig::default()).unwrap();
        assert!(state.image_model().is_none());
        assert!(state.email_sender().is_none());
    }

    #[test]
    fn test_configured_providers() {
        let mut config = EcardConfig::default();
        config.providers.replicate_api_token = Some(Secret::new("r8_token"));
        config.email.backend = EmailBackendKind::Console;

        let state = GatewayState::from_config(config).unwrap();
        assert!(state.image_model().is_some());
        assert!(state.email_sender().is_some());
    }

    #[test]
    fn test_with_email_sender() {
        let state = GatewayState::new(EcardConfig::default(), None, None)
            .with_email_sender(Arc::new(ConsoleBackend::new()));
        assert!(state.email_sender().is_some());
    }

    #[test]
    fn test_clone_state() {
        let state = GatewayState::new(EcardConfig::default(), None, None);
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.config, &cloned.config));
    }
}
