//! Composer-side collaborators for the two gateways
//!
//! [`ImageGeneration`] and [`EmailDispatch`] are what the composer calls;
//! [`GatewayClient`] implements both over HTTP.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::EcardConfig;
use crate::email::DeliveryReceipt;
use crate::error::ErrorBody;
use crate::gateway::generate::GenerateImageResponse;
use crate::gateway::send::SendEcardRequest;

/// Gateway call failures
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure or undecodable response
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a structured failure
    #[error("{error}")]
    Gateway {
        /// HTTP status code
        status: u16,
        /// Failure summary
        error: String,
        /// Diagnostic detail
        details: Option<String>,
    },

    /// Generation succeeded without an image URL
    #[error("gateway returned no image URL")]
    MissingImageUrl,
}

/// Text-to-image generation as seen by the composer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageGeneration: Send + Sync {
    /// Generate an image and return its provider-hosted URL
    async fn generate(&self, prompt: &str) -> Result<String, ClientError>;
}

/// Email dispatch as seen by the composer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailDispatch: Send + Sync {
    /// Send a card and return the provider's delivery receipt
    async fn dispatch(&self, request: &SendEcardRequest) -> Result<DeliveryReceipt, ClientError>;
}

/// HTTP client for the gateway server
///
/// ```rust
/// use ecard::composer::GatewayClient;
///
/// let client = GatewayClient::new(reqwest::Client::new(), "http://127.0.0.1:8787/functions/v1/");
/// assert_eq!(client.endpoint("send-ecard"), "http://127.0.0.1:8787/functions/v1/send-ecard");
/// ```
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    /// Client for gateways mounted under `base_url`
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Client for `composer.gateway_url`, bounded by the server request timeout
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built
    pub fn from_config(config: &EcardConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.server.request_timeout())
            .build()?;
        Ok(Self::new(http, config.composer.gateway_url.clone()))
    }

    /// URL of a named gateway function
    #[must_use]
    pub fn endpoint(&self, function: &str) -> String {
        format!("{}/{function}", self.base_url)
    }

    async fn failure(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let body = response.json::<ErrorBody>().await.ok();
        ClientError::Gateway {
            status: status.as_u16(),
            error: body
                .as_ref()
                .map_or_else(|| status.to_string(), |b| b.error.clone()),
            details: body.and_then(|b| b.details),
        }
    }
}

#[async_trait]
impl ImageGeneration for GatewayClient {
    async fn generate(&self, prompt: &str) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.endpoint("generate-image"))
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }

        let body: GenerateImageResponse = response.json().await?;
        if body.image_url.trim().is_empty() {
            return Err(ClientError::MissingImageUrl);
        }
        Ok(body.image_url)
    }
}

#[async_trait]
impl EmailDispatch for GatewayClient {
    async fn dispatch(&self, request: &SendEcardRequest) -> Result<DeliveryReceipt, ClientError> {
        let response = self
            .http
            .post(self.endpoint("send-ecard"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }

        Ok(response.json().await?)
    }
}
