//! Simulation Error Types

use thiserror::Error;

/// Errors when configuring the synthetic sensor group
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Channel index past the end of the group
    #[error("sensor channel {index} does not exist (group has {count})")]
    NoSuchChannel { index: usize, count: usize },

    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Per-channel settings that do not match the channel count
    #[error("{field} lists {actual} entries for {expected} channels")]
    ChannelCountMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Group without sensors
    #[error("sensor group needs at least one channel")]
    NoChannels,
}

/// Validate a value against an inclusive range, NaN included as out of range
pub(crate) fn check_range(field: &'static str, value: f64, range: (f64, f64)) -> Result<f64, SimError> {
    if value >= range.0 && value <= range.1 {
        Ok(value)
    } else {
        Err(SimError::OutOfRange {
            field,
            value,
            min: range.0,
            max: range.1,
        })
    }
}
