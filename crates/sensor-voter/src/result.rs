//! Voting Result

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Which branch of the quorum vote produced a result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// A group reached quorum and passed the plausibility check
    Accepted,
    /// No anchor gathered enough agreeing sensors
    NoQuorum,
    /// A group reached quorum but its mean strayed from the reference
    Implausible {
        /// Rejected group mean, for diagnostics only
        aggregate: f64,
    },
}

/// Result of one quorum vote.
///
/// `accepted` and `excluded` always partition the input's index range. When
/// no group is trusted, `aggregate` is `None` and every index is excluded.
/// Results are only built by the voter, so the partition cannot be broken
/// from outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VotingResult {
    aggregate: Option<f64>,
    accepted: BTreeSet<usize>,
    excluded: BTreeSet<usize>,
    verdict: Verdict,
}

impl VotingResult {
    /// Trusted group; everything outside `group` is excluded.
    ///
    /// Indices outside `0..sensor_count` are dropped from the group.
    pub(crate) fn from_group(aggregate: f64, mut group: BTreeSet<usize>, sensor_count: usize) -> Self {
        group.retain(|&i| i < sensor_count);
        debug_assert!(!group.is_empty());

        let excluded = (0..sensor_count).filter(|i| !group.contains(i)).collect();
        Self {
            aggregate: Some(aggregate),
            accepted: group,
            excluded,
            verdict: Verdict::Accepted,
        }
    }

    /// No group reached quorum
    pub(crate) fn no_quorum(sensor_count: usize) -> Self {
        Self::distrust_all(sensor_count, Verdict::NoQuorum)
    }

    /// A group was found but failed the plausibility check
    pub(crate) fn implausible(aggregate: f64, sensor_count: usize) -> Self {
        Self::distrust_all(sensor_count, Verdict::Implausible { aggregate })
    }

    fn distrust_all(sensor_count: usize, verdict: Verdict) -> Self {
        Self {
            aggregate: None,
            accepted: BTreeSet::new(),
            excluded: (0..sensor_count).collect(),
            verdict,
        }
    }

    /// Mean of the trusted group, `None` when no group was trusted
    pub fn aggregate(&self) -> Option<f64> {
        self.aggregate
    }

    /// Sensors in the trusted group
    pub fn accepted(&self) -> &BTreeSet<usize> {
        &self.accepted
    }

    /// Sensors outside the trusted group, or all sensors when none was trusted
    pub fn excluded(&self) -> &BTreeSet<usize> {
        &self.excluded
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Whether a trustworthy aggregate was produced
    pub fn is_trusted(&self) -> bool {
        self.aggregate.is_some()
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded.len()
    }

    /// Aggregate, or the caller's fallback when none was trusted
    pub fn aggregate_or(&self, fallback: f64) -> f64 {
        self.aggregate.unwrap_or(fallback)
    }
}
