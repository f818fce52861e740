//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::error::MonitorError;
use crate::settings::LogFormat;

/// Initialize logging; `RUST_LOG` wins over the configured level
pub fn init_logging(level: &str, format: LogFormat) -> Result<(), MonitorError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|e| MonitorError::Logging(e.to_string()))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match format {
        LogFormat::Plain => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| MonitorError::Logging(e.to_string()))?;

    tracing::info!("Logging initialized at level: {}", level);
    Ok(())
}
