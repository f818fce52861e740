//! Voter Error Types

use thiserror::Error;

/// Errors raised when a voter or a vote request is configured
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VoterError {
    /// Smoothing coefficient outside (0, 1]
    #[error("alpha {0} is outside (0, 1]")]
    InvalidAlpha(f64),

    /// Agreement tolerance below zero or NaN
    #[error("tolerance {0} must be a non-negative number")]
    InvalidTolerance(f64),

    /// Plausibility bound below zero or NaN
    #[error("max deviation {0} must be a non-negative number")]
    InvalidMaxDeviation(f64),

    /// Quorum of zero sensors
    #[error("quorum must be at least 1, got {0}")]
    InvalidQuorum(usize),

    /// Reference value that cannot be compared against
    #[error("reference value {0} is not finite")]
    InvalidReference(f64),
}

/// Check that a tolerance is usable (NaN fails the comparison)
pub(crate) fn check_tolerance(tolerance: f64) -> Result<f64, VoterError> {
    if tolerance >= 0.0 {
        Ok(tolerance)
    } else {
        Err(VoterError::InvalidTolerance(tolerance))
    }
}

/// Check that a plausibility bound is usable
pub(crate) fn check_max_deviation(max_deviation: f64) -> Result<f64, VoterError> {
    if max_deviation >= 0.0 {
        Ok(max_deviation)
    } else {
        Err(VoterError::InvalidMaxDeviation(max_deviation))
    }
}
