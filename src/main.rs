//! taskdesk - HTTP Server Entry Point
//!
//! Starts the HTTP server that exposes the task API.

use taskdesk::{api, config::Config};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(
        store = config.store_type.as_str(),
        data_dir = %config.data_dir.display(),
        "Loaded configuration"
    );
    if config.auth.using_dev_secret {
        warn!("DEV_MODE: signing tokens with the built-in development secret; set JWT_SECRET in production");
    }

    api::serve(config).await?;

    Ok(())
}
