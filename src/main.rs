mod bot;
mod calc;
mod commands;
mod config;
mod health;
mod keywords;
mod llm;
mod responder;
mod rng;

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::bot::AppState;
use crate::config::Config;
use crate::health::HealthState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,aichan=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; a missing gateway token is fatal with its own code.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            std::process::exit(2);
        }
    };

    info!("Configuration loaded");
    info!("  Model: {}", config.api.model);
    info!("  Endpoint: {}", config.api.endpoint);
    info!(
        "  AI replies: {}",
        if config.api.api_key.is_some() {
            "enabled"
        } else {
            "disabled (no API key, falling back to apology)"
        }
    );
    info!("  Command prefix: {}", config.command_prefix);

    // Status endpoint, independent of the message pipeline
    let health_port = config.health_port;
    tokio::spawn(async move {
        if let Err(e) = health::serve(HealthState::new(), health_port).await {
            error!("Status endpoint error: {:#}", e);
        }
    });

    // Run the Discord bot
    let state = Arc::new(AppState::new(config));
    info!("Bot is starting...");
    bot::run(state).await?;

    Ok(())
}
