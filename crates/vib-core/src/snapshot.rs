//! SampleSnapshot: immutable copy of the buffer contents for one analysis cycle

use crate::sample::{Axis, Sample};
use std::sync::Arc;
use uuid::Uuid;

/// Ordered, immutable copy of buffered samples
///
/// Snapshots own their samples. Pushes made to the buffer after the
/// snapshot was taken are never visible through it.
#[derive(Debug, Clone)]
pub struct SampleSnapshot {
    /// Unique identifier for this snapshot
    pub id: Uuid,
    samples: Arc<[Sample]>,
}

impl SampleSnapshot {
    /// Create snapshot from an ordered sample sequence
    pub fn new(samples: Vec<Sample>) -> Self {
        Self {
            id: Uuid::new_v4(),
            samples: samples.into(),
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in arrival order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Timestamp column
    pub fn timestamps(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.timestamp).collect()
    }

    /// Values for a single axis
    pub fn channel_data(&self, axis: Axis) -> Vec<f64> {
        self.samples.iter().map(|s| s.axis(axis)).collect()
    }

    /// All axes as separate signals, in X, Y, Z order
    pub fn all_channels(&self) -> [Vec<f64>; 3] {
        Axis::ALL.map(|axis| self.channel_data(axis))
    }

    /// Time covered between first and last sample
    pub fn duration(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }

    /// Sample rate implied by the timestamps, if they are increasing
    pub fn estimated_sample_rate(&self) -> Option<f64> {
        let duration = self.duration();
        if self.samples.len() < 2 || duration <= 0.0 {
            return None;
        }
        Some((self.samples.len() - 1) as f64 / duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| Sample::new(i as f64 * 0.001, i as f64, -(i as f64), 1.0).unwrap())
            .collect()
    }

    #[test]
    fn test_channel_extraction() {
        let snapshot = SampleSnapshot::new(ramp(5));
        let [x, y, z] = snapshot.all_channels();

        assert_eq!(x, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(y, vec![0.0, -1.0, -2.0, -3.0, -4.0]);
        assert_eq!(z, vec![1.0; 5]);
        assert_eq!(snapshot.timestamps().len(), 5);
    }

    #[test]
    fn test_sample_rate_estimate() {
        let snapshot = SampleSnapshot::new(ramp(11));
        let rate = snapshot.estimated_sample_rate().unwrap();
        assert!((rate - 1000.0).abs() < 1e-6);

        assert!(SampleSnapshot::new(ramp(1)).estimated_sample_rate().is_none());
    }
}
