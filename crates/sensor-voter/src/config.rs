//! Voter configuration

use serde::{Deserialize, Serialize};

use crate::error::{check_max_deviation, check_tolerance, VoterError};

/// Smoothing voter configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Maximum distance from the median for a reading to be averaged
    pub tolerance: f64,

    /// Weight of the newest voted value in the moving average, in (0, 1]
    pub alpha: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            tolerance: 10.0,
            alpha: 0.1,
        }
    }
}

impl SmoothingConfig {
    /// Settings used for the 0-100 bar pressure triplex
    pub fn pressure_triplex() -> Self {
        Self {
            tolerance: 15.0,
            alpha: 0.15,
        }
    }

    /// Reject unusable settings
    pub fn validate(&self) -> Result<(), VoterError> {
        check_tolerance(self.tolerance)?;
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(VoterError::InvalidAlpha(self.alpha));
        }
        Ok(())
    }
}

/// Default parameters for the M-out-of-N voter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuorumConfig {
    /// Maximum distance between an anchor and a group member
    pub tolerance: f64,

    /// Maximum distance between the group mean and a reference value
    pub max_deviation: f64,
}

impl Default for QuorumConfig {
    fn default() -> Self {
        Self {
            tolerance: 10.0,
            max_deviation: 5.0,
        }
    }
}

impl QuorumConfig {
    /// Settings used for the 0-100 bar pressure triplex
    pub fn pressure_triplex() -> Self {
        Self {
            tolerance: 15.0,
            max_deviation: 5.0,
        }
    }

    /// Reject unusable settings
    pub fn validate(&self) -> Result<(), VoterError> {
        check_tolerance(self.tolerance)?;
        check_max_deviation(self.max_deviation)?;
        Ok(())
    }
}

/// Configuration for both voters of one sensor group
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoterConfig {
    pub smoothing: SmoothingConfig,
    pub quorum: QuorumConfig,
}

impl VoterConfig {
    /// Settings used for the 0-100 bar pressure triplex
    pub fn pressure_triplex() -> Self {
        Self {
            smoothing: SmoothingConfig::pressure_triplex(),
            quorum: QuorumConfig::pressure_triplex(),
        }
    }

    /// Validate both halves
    pub fn validate(&self) -> Result<(), VoterError> {
        self.smoothing.validate()?;
        self.quorum.validate()
    }
}
