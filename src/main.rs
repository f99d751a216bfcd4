mod config;
mod dispatcher;
mod platform;
mod replies;
mod update;
mod webhook;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::platform::telegram::TelegramApi;
use crate::webhook::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up BOT_TOKEN and friends from a local .env, if there is one
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,zerocode_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Bot API: {}", config.telegram.api_base);
    info!("  Reply style: {}", config.replies.style);
    info!("  Webhook path: {}", config.server.path);

    let bot_token = config.bot_token().map(str::to_string);
    if bot_token.is_none() {
        warn!("BOT_TOKEN is not set, every webhook call will fail until it is");
    }

    let dispatcher = Dispatcher::with_style(config.replies.style);
    info!("  Commands: {:?}", dispatcher.table().command_names());

    let api = Arc::new(TelegramApi::new(config.telegram.api_base.clone()));
    let state = Arc::new(AppState::new(bot_token, dispatcher, api));
    let app = webhook::router(state, &config.server.path);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.bind))?;

    info!(
        "Webhook listening on http://{}{}",
        listener.local_addr()?,
        config.server.path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down...");
        })
        .await
        .context("Server error")?;

    Ok(())
}
