//! Boot — logging init and config load.

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::IngestConfig;

/// Initialise the tracing / logging subsystem.
///
/// Logs go to stderr; stdout may be carrying records.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pgcsvlog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load and validate configuration.
pub fn boot() -> Result<IngestConfig, Box<dyn std::error::Error>> {
    info!("Starting pgcsvlog v{}", env!("CARGO_PKG_VERSION"));

    let config = IngestConfig::load()?;
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    info!(
        input = %config.input_path,
        output = %config.output_path,
        channel_capacity = config.channel_capacity,
        statement_durations = config.statement_durations,
        "Loaded configuration"
    );

    Ok(config)
}
