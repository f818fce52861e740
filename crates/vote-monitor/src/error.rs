//! Monitor Error Types

use sensor_sim::SimError;
use sensor_voter::VoterError;
use thiserror::Error;

/// Errors while setting up or running the monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Settings could not be loaded: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid setting {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },

    #[error("Voter configuration rejected: {0}")]
    Voter(#[from] VoterError),

    #[error("Sensor group configuration rejected: {0}")]
    Sensors(#[from] SimError),

    #[error("Logging initialization failed: {0}")]
    Logging(String),

    #[error("Tick record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
