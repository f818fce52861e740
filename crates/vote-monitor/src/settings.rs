//! Monitor settings
//!
//! Loaded in layers: built-in defaults, an optional TOML file, then
//! `VOTE_MONITOR__*` environment variables (`__` separates nested keys, e.g.
//! `VOTE_MONITOR__SMOOTHING__ALPHA=0.3`).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sensor_sim::SensorGroupConfig;
use sensor_voter::{median, MeasurementSet, Quorum, QuorumConfig, SmoothingConfig};

use crate::error::MonitorError;
use crate::history::DEFAULT_HISTORY_LEN;

const ENV_PREFIX: &str = "VOTE_MONITOR";

/// Value shown when the quorum voter trusts no group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuorumFallback {
    /// Raw median of the present readings, 0.0 if none
    #[default]
    Median,
    /// Last displayed value, 0.0 before the first tick
    HoldLast,
    /// Always 0.0
    Zero,
}

impl QuorumFallback {
    /// Resolve the displayed value for an untrusted tick
    pub fn resolve(self, readings: &MeasurementSet, last_displayed: Option<f64>) -> f64 {
        match self {
            Self::Median => median(&readings.present_values()).unwrap_or(0.0),
            Self::HoldLast => last_displayed.unwrap_or(0.0),
            Self::Zero => 0.0,
        }
    }
}

/// Where tick records go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// One tracing event per tick
    #[default]
    Log,
    /// One JSON object per line on stdout
    Json,
}

/// Log line formatting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Monitor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tick period (milliseconds)
    pub tick_interval_ms: u64,

    /// Ticks to run; 0 runs until interrupted
    pub ticks: u64,

    /// Tick records kept in memory
    pub history_len: usize,

    /// Required number of agreeing sensors (M)
    pub quorum: usize,

    /// Displayed value when no group is trusted
    pub fallback: QuorumFallback,

    /// Check the winning group against the simulated true value
    pub plausibility_check: bool,

    pub output: OutputFormat,
    pub log_level: String,
    pub log_format: LogFormat,

    /// Simulation seed; omitted draws from OS entropy
    pub seed: Option<u64>,

    pub smoothing: SmoothingConfig,
    pub quorum_voter: QuorumConfig,
    pub sensors: SensorGroupConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            ticks: 0,
            history_len: DEFAULT_HISTORY_LEN,
            quorum: 2,
            fallback: QuorumFallback::Median,
            plausibility_check: true,
            output: OutputFormat::Log,
            log_level: "info".to_string(),
            log_format: LogFormat::Plain,
            seed: None,
            smoothing: SmoothingConfig::pressure_triplex(),
            quorum_voter: QuorumConfig::pressure_triplex(),
            sensors: SensorGroupConfig::default(),
        }
    }
}

impl Settings {
    /// Load from an optional TOML file plus environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, MonitorError> {
        let mut builder = config::Config::builder().add_source(Self::defaults()?);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );
        Self::from_config(builder.build()?)
    }

    /// Parse settings from TOML text, without environment overrides
    pub fn from_toml_str(toml: &str) -> Result<Self, MonitorError> {
        let config = config::Config::builder()
            .add_source(Self::defaults()?)
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Self::from_config(config)
    }

    /// Built-in defaults as the lowest layer, so a partial table or a single
    /// environment variable only replaces the keys it names
    fn defaults() -> Result<config::Config, MonitorError> {
        Ok(config::Config::try_from(&Self::default())?)
    }

    fn from_config(config: config::Config) -> Result<Self, MonitorError> {
        let settings: Self = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the monitor cannot run with
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.tick_interval_ms == 0 {
            return Err(MonitorError::InvalidSetting {
                field: "tick_interval_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.history_len == 0 {
            return Err(MonitorError::InvalidSetting {
                field: "history_len",
                reason: "must be at least 1".to_string(),
            });
        }
        Quorum::new(self.quorum)?;
        self.smoothing.validate()?;
        self.quorum_voter.validate()?;
        self.sensors.validate()?;
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Tick budget, `None` for unbounded
    pub fn tick_budget(&self) -> Option<u64> {
        (self.ticks > 0).then_some(self.ticks)
    }
}
