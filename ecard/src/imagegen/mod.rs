//! Text-to-image model provider
//!
//! [`ImageModel`] is the seam the image generation gateway calls through;
//! [`ReplicateModel`] is the production implementation. A generation is a
//! Replicate prediction created with `Prefer: wait`, so most requests finish
//! in one round trip. Predictions still running after that are polled until
//! they reach a terminal state or the provider timeout elapses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ProviderSettings, Secret};

/// Fixed generation parameters forwarded with every prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of images to produce
    pub num_outputs: u32,
    /// Denoising steps
    pub num_inference_steps: u32,
    /// Classifier-free guidance scale
    pub guidance_scale: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            width: 768,
            height: 768,
            num_outputs: 1,
            num_inference_steps: 50,
            guidance_scale: 7.5,
        }
    }
}

/// Image model failures
///
/// Messages carry provider diagnostics only; credentials never appear in them.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or transport failure talking to the provider
    #[error("image provider request failed: {0}")]
    Transport(String),

    /// Provider answered with a failure status
    #[error("image provider returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Prediction ended in `failed` or `canceled`
    #[error("prediction {status}: {reason}")]
    PredictionFailed {
        /// Terminal prediction status
        status: String,
        /// Provider error text
        reason: String,
    },

    /// Prediction succeeded without any output URL
    #[error("prediction returned no image")]
    EmptyOutput,

    /// Provider did not finish in time
    #[error("image provider timed out after {0:?}")]
    Timeout(Duration),

    /// Response body was not the expected shape
    #[error("unexpected provider response: {0}")]
    Decode(String),
}

/// A text-to-image model
///
/// Implementations return the URL of the first generated image.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// Generate one image for `prompt`
    ///
    /// # Errors
    ///
    /// Returns `ProviderError` on any provider, transport or timeout failure
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, ProviderError>;
}

/// Replicate prediction resource
#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default)]
    status: String,
    #[serde(default)]
    output: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    get: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreatePrediction<'a> {
    version: &'a str,
    input: PredictionInput<'a>,
}

#[derive(Debug, Serialize)]
struct PredictionInput<'a> {
    prompt: &'a str,
    #[serde(flatten)]
    params: &'a GenerationParams,
}

/// Outcome of inspecting a prediction
#[derive(Debug, PartialEq, Eq)]
enum PredictionState {
    Succeeded(String),
    Running(Option<String>),
}

impl Prediction {
    fn into_state(self) -> Result<PredictionState, ProviderError> {
        match self.status.as_str() {
            "succeeded" => first_output(self.output.as_ref())
                .map(PredictionState::Succeeded)
                .ok_or(ProviderError::EmptyOutput),
            "failed" | "canceled" => Err(ProviderError::PredictionFailed {
                reason: self
                    .error
                    .map(|e| e.as_str().map_or_else(|| e.to_string(), str::to_string))
                    .unwrap_or_default(),
                status: self.status,
            }),
            _ => Ok(PredictionState::Running(self.urls.and_then(|u| u.get))),
        }
    }
}

/// First URL in a prediction output (an array of URLs or a single URL)
fn first_output(output: Option<&serde_json::Value>) -> Option<String> {
    match output? {
        serde_json::Value::String(url) => Some(url.clone()),
        serde_json::Value::Array(items) => items.first()?.as_str().map(str::to_string),
        _ => None,
    }
}

/// Replicate-hosted text-to-image model
#[derive(Debug, Clone)]
pub struct ReplicateModel {
    http: reqwest::Client,
    base_url: String,
    version: String,
    token: Secret,
    timeout: Duration,
    poll_interval: Duration,
}

impl ReplicateModel {
    /// Create a model client
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        version: impl Into<String>,
        token: Secret,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            version: version.into(),
            token,
            timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
        }
    }

    /// Set the overall bound for one generation
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the interval between status checks
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Build from provider settings
    ///
    /// Returns `Ok(None)` when no API token is configured.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Transport` if the HTTP client cannot be built
    pub fn from_settings(settings: &ProviderSettings) -> Result<Option<Self>, ProviderError> {
        let Some(token) = settings
            .replicate_api_token
            .clone()
            .filter(|token| !token.is_empty())
        else {
            return Ok(None);
        };

        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Some(
            Self::new(http, settings.replicate_base_url.clone(), settings.model_version.clone(), token)
                .with_timeout(settings.timeout())
                .with_poll_interval(settings.poll_interval()),
        ))
    }

    async fn read_prediction(response: reqwest::Response) -> Result<Prediction, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<Prediction>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    async fn run(&self, prompt: &str, params: &GenerationParams) -> Result<String, ProviderError> {
        let request = CreatePrediction {
            version: &self.version,
            input: PredictionInput { prompt, params },
        };

        let response = self
            .http
            .post(format!("{}/predictions", self.base_url))
            .bearer_auth(self.token.expose())
            .header("Prefer", "wait")
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let mut state = Self::read_prediction(response).await?.into_state()?;
        loop {
            match state {
                PredictionState::Succeeded(url) => return Ok(url),
                PredictionState::Running(None) => {
                    return Err(ProviderError::Decode(
                        "running prediction has no status URL".to_string(),
                    ));
                }
                PredictionState::Running(Some(poll_url)) => {
                    debug!(url = %poll_url, "Prediction still running");
                    tokio::time::sleep(self.poll_interval).await;
                    let response = self
                        .http
                        .get(&poll_url)
                        .bearer_auth(self.token.expose())
                        .send()
                        .await
                        .map_err(|e| ProviderError::Transport(e.to_string()))?;
                    state = Self::read_prediction(response).await?.into_state()?;
                }
            }
        }
    }
}

#[async_trait]
impl ImageModel for ReplicateModel {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String, ProviderError> {
        info!(prompt_chars = prompt.chars().count(), "Starting image generation");
        match tokio::time::timeout(self.timeout, self.run(prompt, params)).await {
            Ok(Ok(url)) => {
                info!(url = %url, "Image generated");
                Ok(url)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Image generation failed");
                Err(e)
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "Image generation timed out");
                Err(ProviderError::Timeout(self.timeout))
            }
        }
    }
}
