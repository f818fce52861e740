//! Tick loop running both voters on every sample

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use sensor_sim::RedundantSensorGroup;
use sensor_voter::{
    MOutOfNVoter, MeasurementSet, Quorum, SmoothingVoter, Verdict, VoteOptions, VotingResult,
};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::error::MonitorError;
use crate::history::History;
use crate::settings::{QuorumFallback, Settings};
use crate::status::status_line;

/// Everything produced by one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickRecord {
    pub tick: u64,
    pub timestamp_ms: u64,
    /// Simulated ground truth
    pub true_value: f64,
    pub readings: MeasurementSet,
    /// Smoothing voter output
    pub smoothed: f64,
    pub quorum: VotingResult,
    /// Quorum aggregate, or the fallback value when no group was trusted
    pub displayed: f64,
    pub status: String,
}

/// Owns one sensor group and the voters watching it
pub struct Monitor {
    sensors: RedundantSensorGroup,
    smoothing: SmoothingVoter,
    quorum_voter: MOutOfNVoter,
    quorum: Quorum,
    fallback: QuorumFallback,
    plausibility_check: bool,
    history: History<TickRecord>,
    tick: u64,
}

impl Monitor {
    /// Build the sensor group and voters from validated settings
    pub fn new(settings: &Settings) -> Result<Self, MonitorError> {
        settings.validate()?;

        let sensors = match settings.seed {
            Some(seed) => RedundantSensorGroup::with_seed(&settings.sensors, seed)?,
            None => RedundantSensorGroup::new(&settings.sensors)?,
        };

        info!(
            "Monitor created: M={} of {} sensors, fallback {:?}",
            settings.quorum,
            sensors.channel_count(),
            settings.fallback
        );

        Ok(Self {
            sensors,
            smoothing: SmoothingVoter::new(settings.smoothing)?,
            quorum_voter: MOutOfNVoter::new(settings.quorum_voter)?,
            quorum: Quorum::new(settings.quorum)?,
            fallback: settings.fallback,
            plausibility_check: settings.plausibility_check,
            history: History::new(settings.history_len),
            tick: 0,
        })
    }

    /// Sample once and run both voters on the same readings
    pub fn step(&mut self) -> TickRecord {
        self.tick += 1;
        let readings = self.sensors.sample();
        let true_value = self.sensors.true_value();

        let smoothed = self.smoothing.process(&readings);
        if readings.present_count() == 0 {
            metrics::counter!("vote_monitor_smoothing_fallbacks_total").increment(1);
        }

        let quorum = self.quorum_voter.vote_with(&readings, &self.vote_options(true_value));
        let displayed = match quorum.aggregate() {
            Some(aggregate) => aggregate,
            None => {
                let last = self.history.back().map(|r| r.displayed);
                self.fallback.resolve(&readings, last)
            }
        };

        match quorum.verdict() {
            Verdict::Accepted => {
                metrics::counter!("vote_monitor_quorum_accepted_total").increment(1);
            }
            Verdict::NoQuorum => {
                metrics::counter!("vote_monitor_quorum_missing_total").increment(1);
                debug!(tick = self.tick, "No quorum, displaying fallback {:.2}", displayed);
            }
            Verdict::Implausible { aggregate } => {
                metrics::counter!("vote_monitor_quorum_implausible_total").increment(1);
                warn!(
                    tick = self.tick,
                    "Group mean {:.2} strays from true value {:.2}", aggregate, true_value
                );
            }
        }
        metrics::counter!("vote_monitor_ticks_total").increment(1);

        let record = TickRecord {
            tick: self.tick,
            timestamp_ms: now_ms(),
            true_value,
            status: status_line(self.quorum, &quorum),
            readings,
            smoothed,
            quorum,
            displayed,
        };
        self.history.push(record.clone());
        record
    }

    fn vote_options(&self, true_value: f64) -> VoteOptions {
        let options = VoteOptions::new(self.quorum);
        if !self.plausibility_check {
            return options;
        }
        // Simulated truth is always finite; keep the plain vote if it ever is not
        options.with_reference(true_value).unwrap_or(options)
    }

    /// Tick on a fixed period until the budget runs out or `shutdown` resolves.
    ///
    /// Returns the number of ticks run.
    pub async fn run<F, S>(
        &mut self,
        budget: Option<u64>,
        period: Duration,
        shutdown: S,
        mut on_tick: F,
    ) -> u64
    where
        F: FnMut(&TickRecord),
        S: Future,
    {
        info!("Starting monitor loop every {:?}", period);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        let mut ran = 0;
        while budget.map_or(true, |b| ran < b) {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                _ = interval.tick() => {}
            }

            let record = self.step();
            on_tick(&record);
            ran += 1;
        }

        info!("Monitor loop stopped after {} ticks", ran);
        ran
    }

    pub fn history(&self) -> &History<TickRecord> {
        &self.history
    }

    /// Last `count` tick records, most recent first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &TickRecord> {
        self.history.read_last(count)
    }

    /// Share of retained ticks whose quorum vote was trusted, `None` before the first tick
    pub fn trusted_ratio(&self) -> Option<f64> {
        if self.history.is_empty() {
            return None;
        }
        let trusted = self.history.iter().filter(|r| r.quorum.is_trusted()).count();
        Some(trusted as f64 / self.history.len() as f64)
    }

    pub fn sensors(&self) -> &RedundantSensorGroup {
        &self.sensors
    }

    /// Sensor group, for changing truth, offsets and faults between ticks
    pub fn sensors_mut(&mut self) -> &mut RedundantSensorGroup {
        &mut self.sensors
    }

    pub fn smoothing(&self) -> &SmoothingVoter {
        &self.smoothing
    }

    pub fn smoothing_mut(&mut self) -> &mut SmoothingVoter {
        &mut self.smoothing
    }

    pub fn quorum(&self) -> Quorum {
        self.quorum
    }

    pub fn set_quorum(&mut self, quorum: Quorum) {
        info!("Quorum changed to M={}", quorum);
        self.quorum = quorum;
    }

    pub fn set_fallback(&mut self, fallback: QuorumFallback) {
        self.fallback = fallback;
    }

    pub fn set_plausibility_check(&mut self, enabled: bool) {
        self.plausibility_check = enabled;
    }

    /// Clear sensor faults and offsets
    pub fn reset_faults(&mut self) {
        self.sensors.reset_faults();
    }
}

impl TickRecord {
    /// Log one tick as a tracing event
    pub fn log(&self) {
        info!(
            tick = self.tick,
            true_value = self.true_value,
            smoothed = self.smoothed,
            displayed = self.displayed,
            "{}",
            self.status
        );
    }

    /// Encode as a single JSON line
    pub fn to_json_line(&self) -> Result<String, MonitorError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Resolve when `signal` fires.
///
/// If the signal cannot be listened for, the error is logged and the future
/// never resolves, leaving the tick budget as the only stop condition.
pub async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!("Shutdown signal unavailable: {}", e);
        std::future::pending::<()>().await;
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensor_sim::{FaultModel, SensorGroupConfig};
    use std::collections::BTreeSet;

    fn settings() -> Settings {
        Settings {
            seed: Some(7),
            sensors: SensorGroupConfig {
                noise_std_dev: 0.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_healthy_tick() {
        let mut monitor = Monitor::new(&settings()).unwrap();
        let record = monitor.step();

        assert_eq!(record.tick, 1);
        assert_eq!(record.smoothed, 50.0);
        assert_eq!(record.quorum.aggregate(), Some(50.0));
        assert_eq!(record.displayed, 50.0);
        assert_eq!(record.status, "M=2: 3 OK, 0 OUT");
        assert_eq!(monitor.history().len(), 1);
    }

    #[test]
    fn test_biased_sensor_excluded() {
        let mut monitor = Monitor::new(&settings()).unwrap();
        monitor.sensors_mut().set_offset(2, 40.0).unwrap();

        let record = monitor.step();
        assert_eq!(record.quorum.accepted(), &BTreeSet::from([0, 1]));
        assert_eq!(record.quorum.excluded(), &BTreeSet::from([2]));
        assert_eq!(record.smoothed, 50.0);
        assert_eq!(record.status, "M=2: 2 OK, 1 OUT");
    }

    #[test]
    fn test_no_quorum_uses_median_fallback() {
        let mut monitor = Monitor::new(&settings()).unwrap();
        monitor.sensors_mut().set_offset(0, -30.0).unwrap();
        monitor.sensors_mut().set_faulted(1, true).unwrap();

        // Readings 20 and 50 are 30 apart, tolerance 15
        let record = monitor.step();
        assert_eq!(record.quorum.verdict(), Verdict::NoQuorum);
        assert_eq!(record.displayed, 35.0);
        assert_eq!(record.status, "No group for M=2");
    }

    #[test]
    fn test_plausibility_uses_true_value() {
        let mut monitor = Monitor::new(&settings()).unwrap();
        monitor.sensors_mut().set_offset(0, 10.0).unwrap();
        monitor.sensors_mut().set_offset(1, 10.0).unwrap();
        monitor.sensors_mut().set_offset(2, 10.0).unwrap();

        let record = monitor.step();
        assert_eq!(record.quorum.verdict(), Verdict::Implausible { aggregate: 60.0 });

        monitor.set_plausibility_check(false);
        let record = monitor.step();
        assert_eq!(record.quorum.aggregate(), Some(60.0));
    }

    #[test]
    fn test_total_dropout_holds_smoothing() {
        let mut monitor = Monitor::new(&settings()).unwrap();
        monitor.step();
        for i in 0..3 {
            monitor.sensors_mut().set_faulted(i, true).unwrap();
        }
        monitor.set_fallback(QuorumFallback::HoldLast);

        let record = monitor.step();
        assert_eq!(record.smoothed, 0.0);
        assert_eq!(record.displayed, 50.0);
        assert_eq!(monitor.smoothing().previous_output(), Some(50.0));

        monitor.reset_faults();
        assert!((monitor.step().smoothed - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_sentinel_faults_are_trimmed() {
        let mut config = settings();
        config.sensors.fault_model = FaultModel::ZeroSentinel;
        config.sensors.faulted = vec![false, false, true];
        let mut monitor = Monitor::new(&config).unwrap();

        let record = monitor.step();
        assert_eq!(record.readings.get(2), Some(0.0));
        assert_eq!(record.smoothed, 50.0);
        assert_eq!(record.quorum.excluded(), &BTreeSet::from([2]));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut config = settings();
        config.history_len = 4;
        let mut monitor = Monitor::new(&config).unwrap();
        for _ in 0..10 {
            monitor.step();
        }
        assert_eq!(monitor.history().len(), 4);
        assert_eq!(monitor.history().back().map(|r| r.tick), Some(10));
    }

    #[test]
    fn test_recent_and_trusted_ratio() {
        let mut monitor = Monitor::new(&settings()).unwrap();
        assert_eq!(monitor.trusted_ratio(), None);

        monitor.step();
        monitor.step();
        monitor.sensors_mut().set_offset(0, -30.0).unwrap();
        monitor.sensors_mut().set_faulted(1, true).unwrap();
        monitor.step();
        monitor.step();

        let ticks: Vec<u64> = monitor.recent(3).map(|r| r.tick).collect();
        assert_eq!(ticks, vec![4, 3, 2]);
        assert_eq!(monitor.recent(10).count(), 4);
        assert_eq!(monitor.trusted_ratio(), Some(0.5));
    }

    #[test]
    fn test_record_json() {
        let mut monitor = Monitor::new(&settings()).unwrap();
        monitor.sensors_mut().set_faulted(1, true).unwrap();
        let line = monitor.step().to_json_line().unwrap();
        assert!(line.contains("\"readings\":[50.0,null,50.0]"));
        assert!(line.contains("\"verdict\":{\"kind\":\"accepted\"}"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_at_budget() {
        let mut monitor = Monitor::new(&settings()).unwrap();
        let mut seen = Vec::new();
        let ran = monitor
            .run(
                Some(5),
                Duration::from_millis(50),
                std::future::pending::<()>(),
                |r| seen.push(r.tick),
            )
            .await;

        assert_eq!(ran, 5);
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown() {
        let mut monitor = Monitor::new(&settings()).unwrap();
        let shutdown = tokio::time::sleep(Duration::from_millis(175));
        let ran = monitor
            .run(None, Duration::from_millis(50), shutdown, |_| {})
            .await;

        // Ticks at 0, 50, 100, 150 ms
        assert_eq!(ran, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_signal_does_not_stop_run() {
        let mut monitor = Monitor::new(&settings()).unwrap();
        let signal = async { Err(std::io::Error::new(std::io::ErrorKind::Other, "no handler")) };
        let ran = monitor
            .run(Some(3), Duration::from_millis(50), shutdown_on(signal), |_| {})
            .await;
        assert_eq!(ran, 3);
    }
}
