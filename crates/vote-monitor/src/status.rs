//! Status summary for a quorum vote

use sensor_voter::{Quorum, Verdict, VotingResult};

/// One-line summary, e.g. `M=2: 2 OK, 1 OUT`
pub fn status_line(quorum: Quorum, result: &VotingResult) -> String {
    match result.verdict() {
        Verdict::Accepted => format!(
            "M={}: {} OK, {} OUT",
            quorum,
            result.accepted_count(),
            result.excluded_count()
        ),
        Verdict::NoQuorum => format!("No group for M={}", quorum),
        Verdict::Implausible { aggregate } => {
            format!("M={}: group at {:.1} implausible", quorum, aggregate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensor_voter::{MOutOfNVoter, QuorumConfig, VoteOptions};

    #[test]
    fn test_status_lines() {
        let voter = MOutOfNVoter::new(QuorumConfig::pressure_triplex()).unwrap();
        let m2 = Quorum::new(2).unwrap();

        let result = voter.vote(&[50.0, 52.0, 90.0].into(), m2);
        assert_eq!(status_line(m2, &result), "M=2: 2 OK, 1 OUT");

        let result = voter.vote(&[Some(50.0), None, Some(90.0)].into(), m2);
        assert_eq!(status_line(m2, &result), "No group for M=2");

        let options = VoteOptions::new(m2).with_reference(40.0).unwrap();
        let result = voter.vote_with(&[61.0, 61.6, 90.0].into(), &options);
        assert_eq!(status_line(m2, &result), "M=2: group at 61.3 implausible");
    }
}
