//! Sensor group configuration

use serde::{Deserialize, Serialize};

use crate::channel::FaultModel;
use crate::error::{check_range, SimError};
use crate::{OFFSET_RANGE, TRUE_VALUE_RANGE};

/// Sensor group configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorGroupConfig {
    /// Number of redundant sensors
    pub channels: usize,

    /// Quantity all sensors are measuring
    pub true_value: f64,

    /// Standard deviation of per-reading Gaussian noise
    pub noise_std_dev: f64,

    /// How faulted sensors report
    pub fault_model: FaultModel,

    /// Per-channel bias; empty means no bias
    pub offsets: Vec<f64>,

    /// Per-channel fault flags; empty means all healthy
    pub faulted: Vec<bool>,
}

impl Default for SensorGroupConfig {
    fn default() -> Self {
        Self {
            channels: 3,
            true_value: 50.0,
            noise_std_dev: 1.0,
            fault_model: FaultModel::Absent,
            offsets: Vec::new(),
            faulted: Vec::new(),
        }
    }
}

impl SensorGroupConfig {
    /// Reject settings the group cannot run with
    pub fn validate(&self) -> Result<(), SimError> {
        if self.channels == 0 {
            return Err(SimError::NoChannels);
        }
        check_range("true_value", self.true_value, TRUE_VALUE_RANGE)?;
        if !(self.noise_std_dev >= 0.0 && self.noise_std_dev.is_finite()) {
            return Err(SimError::OutOfRange {
                field: "noise_std_dev",
                value: self.noise_std_dev,
                min: 0.0,
                max: f64::MAX,
            });
        }
        check_len("offsets", self.offsets.len(), self.channels)?;
        check_len("faulted", self.faulted.len(), self.channels)?;
        for &offset in &self.offsets {
            check_range("offset", offset, OFFSET_RANGE)?;
        }
        Ok(())
    }
}

fn check_len(field: &'static str, actual: usize, expected: usize) -> Result<(), SimError> {
    if actual == 0 || actual == expected {
        Ok(())
    } else {
        Err(SimError::ChannelCountMismatch {
            field,
            expected,
            actual,
        })
    }
}
