//! SampleBuffer: bounded FIFO of raw tri-axial samples
//!
//! The buffer is the only shared mutable state in the pipeline. The
//! ingestion task pushes into it while the analysis task takes snapshots,
//! so both operations run under one lock:
//!
//! - `push` appends and, when the buffer is full, evicts the single oldest sample
//! - `snapshot` copies the whole contents while holding the lock, so a
//!   snapshot never observes a push half-applied
//!
//! Copying 100 samples of 32 bytes each is cheap compared to one analysis
//! cycle, and the lock is never held across an await point.

use crate::error::{VibResult, VibError};
use crate::config_error;
use crate::sample::Sample;
use crate::snapshot::SampleSnapshot;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Fixed-capacity, time-ordered ring buffer of samples
///
/// ## Invariants
///
/// - `len() <= capacity()`
/// - iteration order equals arrival order
/// - a full buffer evicts the oldest sample on every push
#[derive(Debug)]
pub struct SampleBuffer {
    capacity: usize,
    samples: Mutex<VecDeque<Sample>>,
    pushed: AtomicU64,
    evicted: AtomicU64,
}

impl SampleBuffer {
    /// Create an empty buffer holding at most `capacity` samples
    pub fn new(capacity: usize) -> VibResult<Self> {
        if capacity == 0 {
            return Err(config_error!("buffer capacity must be at least 1"));
        }

        Ok(Self {
            capacity,
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
            pushed: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
        })
    }

    /// Append a sample, returning the evicted sample if the buffer was full
    pub fn push(&self, sample: Sample) -> Option<Sample> {
        let mut samples = self.lock();
        samples.push_back(sample);
        self.pushed.fetch_add(1, Ordering::Relaxed);

        if samples.len() > self.capacity {
            self.evicted.fetch_add(1, Ordering::Relaxed);
            samples.pop_front()
        } else {
            None
        }
    }

    /// Decode a raw record and append it
    ///
    /// Malformed records fail with [`VibError::Validation`] and are not enqueued.
    pub fn push_record(&self, record: &Value) -> VibResult<Option<Sample>> {
        let sample = Sample::from_record(record)?;
        Ok(self.push(sample))
    }

    /// Immutable ordered copy of the current contents
    pub fn snapshot(&self) -> SampleSnapshot {
        let samples: Vec<Sample> = self.lock().iter().copied().collect();
        SampleSnapshot::new(samples)
    }

    /// Number of buffered samples
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Maximum number of samples held
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if the next push will evict
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Drop all buffered samples
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Total samples accepted since creation
    pub fn total_pushed(&self) -> u64 {
        self.pushed.load(Ordering::Relaxed)
    }

    /// Total samples evicted since creation
    pub fn total_evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    // Samples are plain values, so a panic in another holder cannot leave them torn.
    fn lock(&self) -> MutexGuard<'_, VecDeque<Sample>> {
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TryFrom<usize> for SampleBuffer {
    type Error = VibError;

    fn try_from(capacity: usize) -> VibResult<Self> {
        SampleBuffer::new(capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_at(t: f64) -> Sample {
        Sample::new(t, t * 2.0, t * 3.0, t * 4.0).unwrap()
    }

    #[test]
    fn test_oldest_evicted() {
        let buffer = SampleBuffer::new(3).unwrap();
        for t in [1.0, 2.0, 3.0] {
            assert!(buffer.push(sample_at(t)).is_none());
        }
        let evicted = buffer.push(sample_at(4.0)).unwrap();

        assert_eq!(evicted.timestamp, 1.0);
        assert_eq!(buffer.snapshot().timestamps(), vec![2.0, 3.0, 4.0]);
        assert_eq!(buffer.total_pushed(), 4);
        assert_eq!(buffer.total_evicted(), 1);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let buffer = SampleBuffer::new(4).unwrap();
        buffer.push(sample_at(1.0));
        let snapshot = buffer.snapshot();

        buffer.push(sample_at(2.0));
        buffer.clear();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.samples()[0].timestamp, 1.0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_malformed_record_not_enqueued() {
        let buffer = SampleBuffer::new(4).unwrap();
        buffer.push_record(&json!({"Time": 0.0, "X": 1.0, "Y": 2.0, "Z": 3.0})).unwrap();

        let result = buffer.push_record(&json!({"Time": 0.1, "X": 1.0, "Y": null, "Z": 3.0}));
        assert!(matches!(result, Err(VibError::Validation { .. })));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(SampleBuffer::new(0).is_err());
        assert!(SampleBuffer::try_from(1).unwrap().capacity() == 1);
    }

    #[test]
    fn test_is_full() {
        let buffer = SampleBuffer::new(2).unwrap();
        buffer.push(sample_at(0.0));
        assert!(!buffer.is_full());
        buffer.push(sample_at(1.0));
        assert!(buffer.is_full());
    }
}
