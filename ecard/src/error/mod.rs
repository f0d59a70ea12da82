//! Gateway error types and their HTTP representation
//!
//! Every failure inside a gateway is converted into a [`GatewayError`] before it
//! leaves the handler. The response body is always
//! `{ "error": string, "details"?: string }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON failure body returned by both gateways
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable summary
    pub error: String,

    /// Internal diagnostic detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Gateway error
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing or malformed request input (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing provider credential or backend (500)
    #[error("Configuration error: {summary}: {detail}")]
    Configuration {
        /// Summary shown to the caller
        summary: String,
        /// Which setting is missing
        detail: String,
    },

    /// External model, email provider or store failure (500)
    #[error("Upstream error: {summary}")]
    Upstream {
        /// Summary shown to the caller
        summary: String,
        /// Provider diagnostic, if any
        detail: Option<String>,
    },
}

impl GatewayError {
    /// Create a bad request error
    #[must_use]
    pub fn bad_request<T: Into<String>>(msg: T) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration<S: Into<String>, D: Into<String>>(summary: S, detail: D) -> Self {
        Self::Configuration {
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    /// Create an upstream error
    #[must_use]
    pub fn upstream<S: Into<String>>(summary: S, detail: Option<String>) -> Self {
        Self::Upstream {
            summary: summary.into(),
            detail,
        }
    }

    /// HTTP status for this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Configuration { .. } | Self::Upstream { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn into_body(self) -> ErrorBody {
        match self {
            Self::BadRequest(error) => ErrorBody {
                error,
                details: None,
            },
            Self::Configuration { summary, detail } => ErrorBody {
                error: summary,
                details: Some(detail),
            },
            Self::Upstream { summary, detail } => ErrorBody {
                error: summary,
                details: detail,
            },
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::BadRequest(msg) => tracing::warn!(error = %msg, "Rejected gateway request"),
            Self::Configuration { detail, .. } => {
                tracing::error!(detail = %detail, "Gateway is not configured");
            }
            Self::Upstream { summary, detail } => {
                tracing::error!(error = %summary, detail = ?detail, "Upstream provider failed");
            }
        }
        (status, Json(self.into_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_bad_request_response() {
        let response = GatewayError::bad_request("Missing required field: prompt").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Missing required field: prompt");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_configuration_response_carries_detail() {
        let response =
            GatewayError::configuration("Failed to generate image", "REPLICATE_API_TOKEN is not set")
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to generate image");
        assert_eq!(body["details"], "REPLICATE_API_TOKEN is not set");
    }

    #[tokio::test]
    async fn test_upstream_without_detail() {
        let response = GatewayError::upstream("Invalid `to` field", None).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "error": "Invalid `to` field" }));
    }
}
