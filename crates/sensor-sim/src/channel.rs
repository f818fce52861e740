//! Simulated Sensor Channel

use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use sensor_voter::Measurement;

/// How a faulted sensor shows up in the measurement set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultModel {
    /// Reading is missing
    #[default]
    Absent,
    /// Reading is a literal 0.0 and goes through trimming like any other value
    ZeroSentinel,
}

/// One simulated sensor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorChannel {
    /// Constant bias added to every reading
    pub offset: f64,
    /// Whether the sensor has lost its signal
    pub faulted: bool,
}

impl SensorChannel {
    /// Produce one reading of `true_value`
    pub fn read<R: Rng>(
        &self,
        true_value: f64,
        noise: &Normal<f64>,
        fault_model: FaultModel,
        rng: &mut R,
    ) -> Measurement {
        if self.faulted {
            return match fault_model {
                FaultModel::Absent => None,
                FaultModel::ZeroSentinel => Some(0.0),
            };
        }
        Some(true_value + self.offset + rng.sample(noise))
    }

    /// Clear bias and fault
    pub fn reset(&mut self) {
        self.offset = 0.0;
        self.faulted = false;
    }
}
