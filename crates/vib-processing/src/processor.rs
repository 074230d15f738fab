//! Core signal processor trait and types

use serde::{Deserialize, Serialize};
use std::time::Instant;
use vib_core::VibResult;

/// Core trait for stateless signal transforms
pub trait SignalProcessor: Send + Sync {
    /// Transform one axis signal into a new signal of the same length
    fn process(&self, input: &[f64]) -> VibResult<Vec<f64>>;

    /// Get processor name/identifier
    fn name(&self) -> &str;

    /// Shortest input the processor accepts
    fn min_input_len(&self) -> usize {
        1
    }

    /// Check if processor can handle the given signal
    fn can_process(&self, input: &[f64]) -> bool {
        input.len() >= self.min_input_len()
    }
}

/// Performance metrics for one analysis cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingMetrics {
    /// Actual processing time in microseconds
    pub processing_time_us: u64,
    /// Samples per axis fed into the cycle
    pub input_samples: usize,
    /// Success/failure status
    pub success: bool,
    /// Error message if processing failed
    pub error_message: Option<String>,
}

impl ProcessingMetrics {
    /// Create new processing metrics
    pub fn new() -> Self {
        Self {
            processing_time_us: 0,
            input_samples: 0,
            success: true,
            error_message: None,
        }
    }

    /// Start timing a processing operation
    pub fn start_timing() -> ProcessingTimer {
        ProcessingTimer {
            start_time: Instant::now(),
            metrics: ProcessingMetrics::new(),
        }
    }

    /// Check if processing finished within a latency budget
    pub fn within_latency(&self, max_latency_us: u64) -> bool {
        self.success && self.processing_time_us <= max_latency_us
    }
}

impl Default for ProcessingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper for timing processing operations
pub struct ProcessingTimer {
    start_time: Instant,
    metrics: ProcessingMetrics,
}

impl ProcessingTimer {
    /// Finish timing and return metrics
    pub fn finish(mut self) -> ProcessingMetrics {
        self.metrics.processing_time_us = self.start_time.elapsed().as_micros() as u64;
        self.metrics
    }

    /// Finish with error
    pub fn finish_with_error(mut self, error: &str) -> ProcessingMetrics {
        self.metrics.processing_time_us = self.start_time.elapsed().as_micros() as u64;
        self.metrics.success = false;
        self.metrics.error_message = Some(error.to_string());
        self.metrics
    }

    /// Record the per-axis input length
    pub fn set_input_samples(&mut self, samples: usize) {
        self.metrics.input_samples = samples;
    }
}
