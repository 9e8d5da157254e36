//! polyglotd - multilingual chat relay daemon.

use polyglot_relay::config::{self, Config, LogFormat};
use polyglot_relay::metrics;
use polyglot_relay::network::{Gateway, GatewayOptions};
use polyglot_relay::state::Hub;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let loaded = Config::load(&config_path);

    // Tracing needs the log format from the config; fall back to text.
    let format = loaded
        .as_ref()
        .map(|c| c.server.log_format)
        .unwrap_or_default();
    init_tracing(format);

    let config = loaded.map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {config_path}", errors.len());
    }

    info!(
        server = %config.server.name,
        fallback_language = %config.server.fallback_language,
        "Starting polyglotd"
    );

    if config.server.metrics {
        metrics::init();
        info!("Metrics initialized");
    } else {
        info!("Metrics disabled");
    }

    let hub = Arc::new(Hub::from_config(&config)?);

    let gateway = Gateway::bind(
        config.listen.address,
        hub,
        GatewayOptions::from_config(&config),
    )
    .await?;

    gateway.run().await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
