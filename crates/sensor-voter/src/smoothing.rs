//! Smoothing Voter: median trim followed by EWMA

use tracing::{debug, warn};

use crate::config::SmoothingConfig;
use crate::error::VoterError;
use crate::measurement::MeasurementSet;
use crate::stats::{mean, median};

/// Value returned when no sensor reported
pub const NO_INPUT_OUTPUT: f64 = 0.0;

/// Stateful voter producing one smoothed estimate per tick.
///
/// One instance serves one redundant sensor group; `process` takes `&mut self`
/// so calls are serialized in tick order.
#[derive(Debug, Clone)]
pub struct SmoothingVoter {
    config: SmoothingConfig,
    /// Last output, `None` until the first informative tick
    previous_output: Option<f64>,
}

impl SmoothingVoter {
    /// Create a new voter, rejecting invalid tolerance or alpha
    pub fn new(config: SmoothingConfig) -> Result<Self, VoterError> {
        config.validate()?;
        Ok(Self {
            config,
            previous_output: None,
        })
    }

    /// Shorthand for `new` with explicit parameters
    pub fn with_params(tolerance: f64, alpha: f64) -> Result<Self, VoterError> {
        Self::new(SmoothingConfig { tolerance, alpha })
    }

    /// Vote one tick of readings and update the moving average.
    ///
    /// All-absent input returns `0.0` and leaves the history untouched.
    pub fn process(&mut self, measurements: &MeasurementSet) -> f64 {
        let filtered = measurements.present_values();

        let Some(med) = median(&filtered) else {
            warn!("No sensor reported, holding smoothing history");
            return NO_INPUT_OUTPUT;
        };

        let valid: Vec<f64> = filtered
            .iter()
            .copied()
            .filter(|v| (v - med).abs() <= self.config.tolerance)
            .collect();

        let voted_value = mean(&valid).unwrap_or(med);

        let output = match self.previous_output {
            None => voted_value,
            Some(prev) => self.config.alpha * voted_value + (1.0 - self.config.alpha) * prev,
        };

        debug!(
            median = med,
            trimmed = filtered.len() - valid.len(),
            voted_value,
            output,
            "Smoothing vote"
        );

        self.previous_output = Some(output);
        output
    }

    /// Last output, if any tick has been voted since creation or reset
    pub fn previous_output(&self) -> Option<f64> {
        self.previous_output
    }

    /// Current configuration
    pub fn config(&self) -> &SmoothingConfig {
        &self.config
    }

    /// Replace the configuration; the smoothing history is kept
    pub fn reconfigure(&mut self, config: SmoothingConfig) -> Result<(), VoterError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Forget the smoothing history
    pub fn reset(&mut self) {
        self.previous_output = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn triplex() -> SmoothingVoter {
        SmoothingVoter::new(SmoothingConfig::pressure_triplex()).unwrap()
    }

    #[test]
    fn test_first_call_is_trimmed_mean() {
        let mut voter = triplex();
        let out = voter.process(&[50.0, 52.0, 48.0].into());
        assert!((out - 50.0).abs() < 1e-12);
        assert_eq!(voter.previous_output(), Some(out));
    }

    #[test]
    fn test_outlier_trimmed_then_smoothed() {
        let mut voter = triplex();
        voter.process(&[50.0, 52.0, 48.0].into());

        // Median 52, 200 is 148 away and dropped, voted value 51
        let out = voter.process(&[50.0, 52.0, 200.0].into());
        assert!((out - 50.15).abs() < 1e-9);
    }

    #[test]
    fn test_all_absent_holds_history() {
        let mut voter = triplex();
        voter.process(&[50.0, 52.0, 48.0].into());

        let out = voter.process(&[None, None, None].into());
        assert_eq!(out, 0.0);
        assert_eq!(voter.previous_output(), Some(50.0));

        // Next tick blends with 50.0, not with the fallback
        let out = voter.process(&[60.0, 60.0, 60.0].into());
        assert!((out - (0.15 * 60.0 + 0.85 * 50.0)).abs() < 1e-9);
    }

    #[test]
    fn test_all_absent_on_fresh_voter() {
        let mut voter = triplex();
        assert_eq!(voter.process(&MeasurementSet::default()), 0.0);
        assert_eq!(voter.previous_output(), None);
    }

    #[test]
    fn test_dropout_ignored() {
        let mut voter = triplex();
        let out = voter.process(&[Some(40.0), None, Some(44.0)].into());
        assert!((out - 42.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_reading_ignores_tolerance() {
        let mut voter = SmoothingVoter::with_params(0.0, 0.5).unwrap();
        assert_eq!(voter.process(&[None, Some(73.0), None].into()), 73.0);
    }

    #[test]
    fn test_nothing_within_tolerance_uses_median() {
        // Even count, median 70 sits 20 from both readings
        let mut voter = SmoothingVoter::with_params(5.0, 0.5).unwrap();
        assert_eq!(voter.process(&[50.0, 90.0].into()), 70.0);
    }

    #[test]
    fn test_step_change_converges_geometrically() {
        let alpha = 0.25;
        let mut voter = SmoothingVoter::with_params(15.0, alpha).unwrap();
        voter.process(&[50.0, 50.0, 50.0].into());

        let target = 80.0;
        let mut error = 50.0 - target;
        for _ in 0..20 {
            let out = voter.process(&[target, target, target].into());
            error *= 1.0 - alpha;
            assert!((out - target - error).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reset_forgets_history() {
        let mut voter = triplex();
        voter.process(&[10.0].into());
        voter.reset();
        assert_eq!(voter.previous_output(), None);
        assert_eq!(voter.process(&[90.0].into()), 90.0);
    }

    #[test]
    fn test_reconfigure_keeps_history() {
        let mut voter = triplex();
        voter.process(&[50.0].into());

        assert!(voter
            .reconfigure(SmoothingConfig {
                tolerance: 15.0,
                alpha: 2.0
            })
            .is_err());
        assert_eq!(voter.config().alpha, 0.15);

        voter
            .reconfigure(SmoothingConfig {
                tolerance: 15.0,
                alpha: 1.0,
            })
            .unwrap();
        assert_eq!(voter.previous_output(), Some(50.0));
        assert_eq!(voter.process(&[60.0].into()), 60.0);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(SmoothingVoter::with_params(-1.0, 0.5).is_err());
        assert!(SmoothingVoter::with_params(1.0, 0.0).is_err());
    }

    proptest! {
        #[test]
        fn first_output_within_reading_range(
            readings in prop::collection::vec(prop::option::of(-1000.0f64..1000.0), 1..9),
            tolerance in 0.0f64..100.0,
        ) {
            let set = MeasurementSet::new(readings);
            let present = set.present_values();
            prop_assume!(!present.is_empty());

            let mut voter = SmoothingVoter::with_params(tolerance, 0.3).unwrap();
            let out = voter.process(&set);

            let lo = present.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(out >= lo - 1e-9 && out <= hi + 1e-9);
        }

        #[test]
        fn constant_input_is_fixed_point(
            value in -1000.0f64..1000.0,
            n in 1usize..7,
            alpha in 0.01f64..1.0,
        ) {
            let mut voter = SmoothingVoter::with_params(10.0, alpha).unwrap();
            let set = MeasurementSet::from(vec![value; n]);
            for _ in 0..10 {
                prop_assert!((voter.process(&set) - value).abs() < 1e-9);
            }
        }
    }
}
