//! Synthetic Redundant Sensor Group
//!
//! Produces one [`MeasurementSet`](sensor_voter::MeasurementSet) per tick from
//! N simulated sensors watching the same true value, with per-channel bias,
//! Gaussian noise, and fault injection.

mod channel;
mod config;
mod error;
mod group;

pub use channel::{FaultModel, SensorChannel};
pub use config::SensorGroupConfig;
pub use error::SimError;
pub use group::RedundantSensorGroup;

/// Range of the simulated true value
pub const TRUE_VALUE_RANGE: (f64, f64) = (0.0, 100.0);

/// Range of a channel's bias offset
pub const OFFSET_RANGE: (f64, f64) = (-50.0, 50.0);
