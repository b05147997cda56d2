use anyhow::Result;
use prospector_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use prospector_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = prospector_server::bootstrap_with_config(config)?;
    let router = prospector_server::router(app.state);

    prospector_server::serve(router, &app.config.server.bind_address, app.config.server.port)
        .await?;

    Ok(())
}
