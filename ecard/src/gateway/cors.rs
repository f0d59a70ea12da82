//! Cross-origin handling for browser callers
//!
//! Both gateways answer `OPTIONS` immediately from here, without touching
//! state or providers, and every response carries the permissive CORS headers.

use axum::response::{IntoResponse, Response};
use http::{header, HeaderValue, StatusCode};

/// `Access-Control-Allow-Origin` value
pub const ALLOW_ORIGIN: &str = "*";

/// `Access-Control-Allow-Headers` value
pub const ALLOW_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// `Access-Control-Allow-Methods` value
pub const ALLOW_METHODS: &str = "POST, OPTIONS";

/// Adds the CORS headers to a response
pub async fn apply_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    response
}

/// Preflight answer for the image generation gateway (200, empty body)
pub async fn preflight_ok() -> impl IntoResponse {
    StatusCode::OK
}

/// Preflight answer for the email dispatch gateway (204, empty body)
pub async fn preflight_no_content() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_apply_headers() {
        let response = apply_headers(StatusCode::OK.into_response()).await;
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
            ALLOW_HEADERS
        );
    }

    #[tokio::test]
    async fn test_preflight_bodies_are_empty() {
        let ok = preflight_ok().await.into_response();
        assert_eq!(ok.status(), StatusCode::OK);
        assert!(to_bytes(ok.into_body(), usize::MAX).await.unwrap().is_empty());

        let no_content = preflight_no_content().await.into_response();
        assert_eq!(no_content.status(), StatusCode::NO_CONTENT);
        assert!(to_bytes(no_content.into_body(), usize::MAX)
            .await
            .unwrap()
            .is_empty());
    }
}
