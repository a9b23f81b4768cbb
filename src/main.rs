mod bot;
mod config;
mod effects;
mod handlers;
mod platform;
mod posts;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,channel_poster=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }

    // Optional TOML file; environment variables take precedence over it
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    if let Some(path) = &config_path {
        info!("Loading configuration from: {}", path.display());
    }

    // Nothing talks to Telegram until a valid config exists: the Bot is built inside bot::run
    let config = match Config::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("❌ {}", e);
            return Err(e).context("Invalid configuration");
        }
    };

    info!("Configuration loaded successfully");
    info!("  Channel: {}", config.telegram.channel_id);
    if config.admins().is_empty() {
        info!("  Admins: none configured, /post is unrestricted");
    } else {
        info!("  Admins: {}", config.admins().len());
    }

    bot::run(Arc::new(config)).await?;

    Ok(())
}
