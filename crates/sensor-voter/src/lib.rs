//! Redundant Sensor Voting
//!
//! Reduces N redundant, possibly noisy, possibly missing readings of one
//! physical quantity to a single estimate:
//! - [`SmoothingVoter`]: median trim followed by an exponential moving average
//! - [`MOutOfNVoter`]: greedy quorum clustering with an optional plausibility check

mod config;
mod error;
mod measurement;
mod quorum;
mod result;
mod smoothing;
mod stats;

pub use config::{QuorumConfig, SmoothingConfig, VoterConfig};
pub use error::VoterError;
pub use measurement::{Measurement, MeasurementSet};
pub use quorum::{MOutOfNVoter, Quorum, VoteOptions};
pub use result::{Verdict, VotingResult};
pub use smoothing::SmoothingVoter;
pub use stats::{mean, median};
