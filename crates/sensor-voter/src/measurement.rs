//! Measurement Sets

use serde::{Deserialize, Serialize};

/// One sensor reading; `None` means the sensor dropped out this tick
pub type Measurement = Option<f64>;

/// Readings from one redundant sensor group for a single tick.
///
/// Position is sensor identity: index `i` always refers to the same physical
/// sensor for the lifetime of a voting session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasurementSet {
    readings: Vec<Measurement>,
}

impl MeasurementSet {
    /// Create a set from per-sensor readings
    pub fn new(readings: Vec<Measurement>) -> Self {
        Self { readings }
    }

    /// Number of sensor slots, present or not
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Check if the set has no sensor slots
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Reading for sensor `index`, flattened so out-of-range and dropout look the same
    pub fn get(&self, index: usize) -> Measurement {
        self.readings.get(index).copied().flatten()
    }

    /// All slots in sensor order
    pub fn readings(&self) -> &[Measurement] {
        &self.readings
    }

    /// Present readings paired with their sensor index, ascending
    pub fn present(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.readings
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.map(|v| (i, v)))
    }

    /// Present values only, sensor identity dropped
    pub fn present_values(&self) -> Vec<f64> {
        self.readings.iter().flatten().copied().collect()
    }

    /// Number of sensors that reported this tick
    pub fn present_count(&self) -> usize {
        self.readings.iter().filter(|m| m.is_some()).count()
    }

    /// Full index range `0..len`
    pub fn indices(&self) -> std::ops::Range<usize> {
        0..self.readings.len()
    }
}

impl From<Vec<Measurement>> for MeasurementSet {
    fn from(readings: Vec<Measurement>) -> Self {
        Self::new(readings)
    }
}

impl From<Vec<f64>> for MeasurementSet {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values.into_iter().map(Some).collect())
    }
}

impl<const N: usize> From<[Measurement; N]> for MeasurementSet {
    fn from(readings: [Measurement; N]) -> Self {
        Self::new(readings.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for MeasurementSet {
    fn from(values: [f64; N]) -> Self {
        Self::new(values.iter().copied().map(Some).collect())
    }
}

impl FromIterator<Measurement> for MeasurementSet {
    fn from_iter<I: IntoIterator<Item = Measurement>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_keeps_indices() {
        let set = MeasurementSet::from([Some(50.0), None, Some(90.0)]);
        let present: Vec<_> = set.present().collect();
        assert_eq!(present, vec![(0, 50.0), (2, 90.0)]);
        assert_eq!(set.present_count(), 2);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_get_flattens_dropout() {
        let set = MeasurementSet::from([Some(1.0), None]);
        assert_eq!(set.get(0), Some(1.0));
        assert_eq!(set.get(1), None);
        assert_eq!(set.get(7), None);
    }

    #[test]
    fn test_all_absent() {
        let set: MeasurementSet = vec![None, None, None].into();
        assert!(set.present_values().is_empty());
        assert_eq!(set.indices(), 0..3);
    }
}
