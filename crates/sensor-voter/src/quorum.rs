//! M-out-of-N Quorum Voter

use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::QuorumConfig;
use crate::error::{check_max_deviation, check_tolerance, VoterError};
use crate::measurement::MeasurementSet;
use crate::result::VotingResult;

/// Minimum number of agreeing sensors (M), at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Quorum(NonZeroUsize);

impl Quorum {
    pub fn new(m: usize) -> Result<Self, VoterError> {
        NonZeroUsize::new(m)
            .map(Self)
            .ok_or(VoterError::InvalidQuorum(m))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl TryFrom<usize> for Quorum {
    type Error = VoterError;

    fn try_from(m: usize) -> Result<Self, Self::Error> {
        Self::new(m)
    }
}

impl From<Quorum> for usize {
    fn from(quorum: Quorum) -> Self {
        quorum.get()
    }
}

impl fmt::Display for Quorum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-call parameters for [`MOutOfNVoter::vote_with`].
///
/// Unset tolerance and max deviation fall back to the voter's defaults.
/// A reference value is ground truth and only exists in tests and
/// simulations; production callers leave it unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteOptions {
    quorum: Quorum,
    tolerance: Option<f64>,
    reference: Option<f64>,
    max_deviation: Option<f64>,
}

impl VoteOptions {
    pub fn new(quorum: Quorum) -> Self {
        Self {
            quorum,
            tolerance: None,
            reference: None,
            max_deviation: None,
        }
    }

    /// Override the agreement tolerance for this call
    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self, VoterError> {
        self.tolerance = Some(check_tolerance(tolerance)?);
        Ok(self)
    }

    /// Check the winning group's mean against a known true value
    pub fn with_reference(mut self, reference: f64) -> Result<Self, VoterError> {
        if !reference.is_finite() {
            return Err(VoterError::InvalidReference(reference));
        }
        self.reference = Some(reference);
        Ok(self)
    }

    /// Override the plausibility bound for this call
    pub fn with_max_deviation(mut self, max_deviation: f64) -> Result<Self, VoterError> {
        self.max_deviation = Some(check_max_deviation(max_deviation)?);
        Ok(self)
    }

    pub fn quorum(&self) -> Quorum {
        self.quorum
    }

    pub fn reference(&self) -> Option<f64> {
        self.reference
    }
}

/// Stateless quorum voter.
///
/// Each present sensor in ascending index order is tried as an anchor; its
/// group is every present sensor within `tolerance` of the anchor. Members
/// only need to agree with the anchor, not with each other. The first group
/// of at least M sensors wins, even if a later anchor would gather more.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MOutOfNVoter {
    defaults: QuorumConfig,
}

impl MOutOfNVoter {
    /// Create a voter with default tolerance and max deviation
    pub fn new(defaults: QuorumConfig) -> Result<Self, VoterError> {
        defaults.validate()?;
        Ok(Self { defaults })
    }

    /// Default parameters used when a call does not override them
    pub fn defaults(&self) -> &QuorumConfig {
        &self.defaults
    }

    /// Vote with the default tolerance and no plausibility check
    pub fn vote(&self, measurements: &MeasurementSet, quorum: Quorum) -> VotingResult {
        self.vote_with(measurements, &VoteOptions::new(quorum))
    }

    /// Vote with per-call overrides
    pub fn vote_with(&self, measurements: &MeasurementSet, options: &VoteOptions) -> VotingResult {
        let tolerance = options.tolerance.unwrap_or(self.defaults.tolerance);
        let max_deviation = options.max_deviation.unwrap_or(self.defaults.max_deviation);
        let m = options.quorum.get();
        let sensor_count = measurements.len();

        let present: Vec<(usize, f64)> = measurements.present().collect();

        for &(anchor, anchor_value) in &present {
            let group: Vec<(usize, f64)> = present
                .iter()
                .copied()
                .filter(|&(j, v)| j == anchor || (anchor_value - v).abs() <= tolerance)
                .collect();

            if group.len() < m {
                continue;
            }

            let aggregate = group.iter().map(|&(_, v)| v).sum::<f64>() / group.len() as f64;

            if let Some(reference) = options.reference {
                if (aggregate - reference).abs() > max_deviation {
                    warn!(
                        anchor,
                        aggregate, reference, max_deviation, "Quorum group failed plausibility check"
                    );
                    return VotingResult::implausible(aggregate, sensor_count);
                }
            }

            let accepted: BTreeSet<usize> = group.iter().map(|&(i, _)| i).collect();
            debug!(anchor, aggregate, accepted = accepted.len(), m, "Quorum reached");
            return VotingResult::from_group(aggregate, accepted, sensor_count);
        }

        debug!(present = present.len(), m, "No quorum");
        VotingResult::no_quorum(sensor_count)
    }
}
