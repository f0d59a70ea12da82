//! Image generation gateway
//!
//! `POST { prompt }` → `{ imageUrl }`. The provider credential is checked
//! before the request body, so an unconfigured deployment always answers with
//! a configuration failure.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::GatewayError;
use crate::imagegen::GenerationParams;
use crate::state::GatewayState;

const FAILURE_SUMMARY: &str = "Failed to generate image";

/// Request body
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GenerateImageRequest {
    /// Text prompt
    #[serde(default)]
    #[validate(length(min = 1))]
    pub prompt: Option<String>,
}

/// Success body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageResponse {
    /// Provider-hosted image URL
    pub image_url: String,
}

/// Handle `POST /functions/v1/generate-image`
pub async fn generate_image(
    State(state): State<GatewayState>,
    payload: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Result<Json<GenerateImageResponse>, GatewayError> {
    let model = state
        .image_model()
        .ok_or_else(|| GatewayError::configuration(FAILURE_SUMMARY, "REPLICATE_API_TOKEN is not set"))?;

    let Json(request) =
        payload.map_err(|rejection| GatewayError::bad_request(rejection.body_text()))?;

    let prompt = request
        .validate()
        .ok()
        .and(request.prompt.as_deref())
        .map(str::trim)
        .filter(|prompt| !prompt.is_empty())
        .ok_or_else(|| GatewayError::bad_request("Missing required field: prompt"))?;

    tracing::info!(prompt = %prompt, "Generating image");

    let image_url = model
        .generate(prompt, &GenerationParams::default())
        .await
        .map_err(|e| GatewayError::upstream(FAILURE_SUMMARY, Some(e.to_string())))?;

    Ok(Json(GenerateImageResponse { image_url }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EcardConfig;
    use crate::imagegen::{MockImageModel, ProviderError};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::Arc;

    fn state_with(model: MockImageModel) -> GatewayState {
        GatewayState::new(EcardConfig::default(), Some(Arc::new(model)), None)
    }

    fn body(prompt: Option<&str>) -> Result<Json<GenerateImageRequest>, JsonRejection> {
        Ok(Json(GenerateImageRequest {
            prompt: prompt.map(str::to_string),
        }))
    }

    #[tokio::test]
    async fn test_forwards_trimmed_prompt_with_fixed_params() {
        let mut model = MockImageModel::new();
        model
            .expect_generate()
            .withf(|prompt, params| prompt == "A cat in space" && *params == GenerationParams::default())
            .times(1)
            .returning(|_, _| Ok("https://ext/img.png".to_string()));

        let Json(response) = generate_image(State(state_with(model)), body(Some("  A cat in space ")))
            .await
            .unwrap();
        assert_eq!(response.image_url, "https://ext/img.png");
    }

    #[tokio::test]
    async fn test_blank_prompt_is_bad_request() {
        for prompt in [None, Some(""), Some("   ")] {
            let mut model = MockImageModel::new();
            model.expect_generate().never();

            let error = generate_image(State(state_with(model)), body(prompt))
                .await
                .unwrap_err();
            assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_missing_token_is_configuration_error() {
        let state = GatewayState::new(EcardConfig::default(), None, None);
        let error = generate_image(State(state), body(None)).await.unwrap_err();
        assert!(matches!(error, GatewayError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_provider_failure_is_upstream_error() {
        let mut model = MockImageModel::new();
        model.expect_generate().returning(|_, _| {
            Err(ProviderError::Status {
                status: 402,
                body: "insufficient credit".to_string(),
            })
        });

        let error = generate_image(State(state_with(model)), body(Some("A cat")))
            .await
            .unwrap_err();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
