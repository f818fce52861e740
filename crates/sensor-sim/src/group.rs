//! Redundant Sensor Group

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;
use sensor_voter::MeasurementSet;
use tracing::{debug, info};

use crate::channel::{FaultModel, SensorChannel};
use crate::config::SensorGroupConfig;
use crate::error::{check_range, SimError};
use crate::{OFFSET_RANGE, TRUE_VALUE_RANGE};

/// N simulated sensors measuring one shared true value
pub struct RedundantSensorGroup {
    channels: Vec<SensorChannel>,
    true_value: f64,
    noise: Normal<f64>,
    fault_model: FaultModel,
    rng: ChaCha8Rng,
    /// Ticks sampled so far
    sequence: u64,
}

impl RedundantSensorGroup {
    /// Create a group seeded from OS entropy
    pub fn new(config: &SensorGroupConfig) -> Result<Self, SimError> {
        Self::build(config, ChaCha8Rng::from_entropy())
    }

    /// Create a group with a fixed seed for reproducible runs
    pub fn with_seed(config: &SensorGroupConfig, seed: u64) -> Result<Self, SimError> {
        Self::build(config, ChaCha8Rng::seed_from_u64(seed))
    }

    fn build(config: &SensorGroupConfig, rng: ChaCha8Rng) -> Result<Self, SimError> {
        config.validate()?;

        let channels = (0..config.channels)
            .map(|i| SensorChannel {
                offset: config.offsets.get(i).copied().unwrap_or(0.0),
                faulted: config.faulted.get(i).copied().unwrap_or(false),
            })
            .collect();

        info!(
            "Sensor group created with {} channels around {:.1}",
            config.channels, config.true_value
        );

        Ok(Self {
            channels,
            true_value: config.true_value,
            noise: make_noise(config.noise_std_dev)?,
            fault_model: config.fault_model,
            rng,
            sequence: 0,
        })
    }

    /// Read every channel once
    pub fn sample(&mut self) -> MeasurementSet {
        self.sequence += 1;
        let true_value = self.true_value;
        let set: MeasurementSet = self
            .channels
            .iter()
            .map(|ch| ch.read(true_value, &self.noise, self.fault_model, &mut self.rng))
            .collect();
        debug!(tick = self.sequence, readings = ?set.readings(), "Sampled sensor group");
        set
    }

    pub fn true_value(&self) -> f64 {
        self.true_value
    }

    /// Move the quantity all sensors are measuring
    pub fn set_true_value(&mut self, value: f64) -> Result<(), SimError> {
        self.true_value = check_range("true_value", value, TRUE_VALUE_RANGE)?;
        Ok(())
    }

    /// Change the noise level
    pub fn set_noise_std_dev(&mut self, std_dev: f64) -> Result<(), SimError> {
        self.noise = make_noise(std_dev)?;
        Ok(())
    }

    pub fn fault_model(&self) -> FaultModel {
        self.fault_model
    }

    pub fn set_fault_model(&mut self, fault_model: FaultModel) {
        self.fault_model = fault_model;
    }

    /// Bias one channel
    pub fn set_offset(&mut self, index: usize, offset: f64) -> Result<(), SimError> {
        let offset = check_range("offset", offset, OFFSET_RANGE)?;
        self.channel_mut(index)?.offset = offset;
        Ok(())
    }

    /// Fail or restore one channel
    pub fn set_faulted(&mut self, index: usize, faulted: bool) -> Result<(), SimError> {
        self.channel_mut(index)?.faulted = faulted;
        info!(channel = index, faulted, "Sensor fault toggled");
        Ok(())
    }

    /// Clear all offsets and faults
    pub fn reset_faults(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
        info!("All sensor faults cleared");
    }

    pub fn channel(&self, index: usize) -> Option<&SensorChannel> {
        self.channels.get(index)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Ticks sampled since creation
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    fn channel_mut(&mut self, index: usize) -> Result<&mut SensorChannel, SimError> {
        let count = self.channels.len();
        self.channels
            .get_mut(index)
            .ok_or(SimError::NoSuchChannel { index, count })
    }
}

/// Zero-mean Gaussian; `Normal::new` alone accepts a negative deviation
fn make_noise(std_dev: f64) -> Result<Normal<f64>, SimError> {
    let range = (0.0, f64::MAX);
    let std_dev = check_range("noise_std_dev", std_dev, range)?;
    Normal::new(0.0, std_dev).map_err(|_| SimError::OutOfRange {
        field: "noise_std_dev",
        value: std_dev,
        min: range.0,
        max: range.1,
    })
}
