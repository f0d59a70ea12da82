//! Gateway server command

use anyhow::{Context, Result};
use console::style;
use ecard::{gateway, state::GatewayState};
use std::path::Path;
use tokio::net::TcpListener;

/// Run both gateways until interrupted
pub struct ServeCommand;

impl ServeCommand {
    /// Execute the command
    pub async fn execute(config: Option<&Path>) -> Result<()> {
        super::init_logging()?;
        let config = super::load_config(config)?;
        let addr = config.server.bind_address();
        let state = GatewayState::from_config(config)?;

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        println!(
            "{} {}",
            style("Gateways listening on").green().bold(),
            style(format!("http://{addr}{}", gateway::FUNCTIONS_PREFIX)).cyan()
        );
        tracing::info!(%addr, "Gateway server started");

        axum::serve(listener, gateway::router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Gateway server failed")?;

        tracing::info!("Gateway server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
