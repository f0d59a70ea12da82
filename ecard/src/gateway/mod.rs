//! Gateway HTTP server
//!
//! Two stateless handlers mounted the way serverless functions are addressed:
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | `POST`, `OPTIONS` | `/functions/v1/generate-image` | [`generate::generate_image`] |
//! | `POST`, `OPTIONS` | `/functions/v1/send-ecard` | [`send::send_ecard`] |
//! | `GET` | `/health` | liveness |
//!
//! With the local storage backend the upload directory is also served under
//! `/uploads`, which is what local public URLs point at.

pub mod cors;
pub mod generate;
pub mod send;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    limit::RequestBodyLimitLayer, services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::config::StorageBackendKind;
use crate::state::GatewayState;

/// Mount point of both gateways
pub const FUNCTIONS_PREFIX: &str = "/functions/v1";

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build the gateway router
///
/// # Example
///
/// ```rust
/// use ecard::{config::EcardConfig, gateway, state::GatewayState};
///
/// # fn example() -> anyhow::Result<()> {
/// let state = GatewayState::from_config(EcardConfig::default())?;
/// let app = gateway::router(state);
/// # Ok(())
/// # }
/// ```
#[allow(deprecated)] // tower-http 0.6.x deprecates TimeoutLayer::new; kept for identical behavior
pub fn router(state: GatewayState) -> Router {
    let config = state.config();
    let timeout = config.server.request_timeout();
    let body_limit = config.server.body_limit_bytes;
    let uploads = (config.storage.backend == StorageBackendKind::Local)
        .then(|| ServeDir::new(config.storage.local_root.clone()));

    let functions = Router::new()
        .route(
            "/generate-image",
            post(generate::generate_image).options(cors::preflight_ok),
        )
        .route(
            "/send-ecard",
            post(send::send_ecard).options(cors::preflight_no_content),
        );

    let mut app = Router::new()
        .nest(FUNCTIONS_PREFIX, functions)
        .route("/health", get(health));

    if let Some(uploads) = uploads {
        app = app.nest_service("/uploads", uploads);
    }

    app.layer(middleware::map_response(cors::apply_headers))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
