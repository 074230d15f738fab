//! Per-cycle analysis of a buffer snapshot
//!
//! Each axis of the snapshot is band-limited, then summarized with
//! [`AxisStats`] and decomposed into wavelet bands. A failure on any axis
//! fails the whole cycle; partial results are never published.
//!
//! Stages always run at the configured sampling rate. A window whose
//! timestamps imply a rate far from it is still analysed, with a warning.

use crate::config::AnalysisConfig;
use crate::features::{AxisStats, FeatureExtractor};
use crate::filters::BandFilter;
use crate::processor::{ProcessingMetrics, SignalProcessor};
use crate::wavelet::{DecompositionResult, WaveletDecomposer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use uuid::Uuid;
use vib_core::{Axis, SampleSnapshot, VibResult};

/// Relative deviation of the timestamp rate tolerated without a warning
const RATE_TOLERANCE: f64 = 0.1;

/// Everything computed for one axis in one cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisAnalysis {
    /// Band-limited signal, same length as the snapshot
    pub filtered: Vec<f64>,
    pub stats: AxisStats,
    pub decomposition: DecompositionResult,
}

/// Immutable result of one analysis cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleResult {
    /// Monotonic cycle counter within a session
    pub cycle: u64,
    /// Snapshot the cycle was computed from
    pub snapshot_id: Uuid,
    pub completed_at: DateTime<Utc>,
    /// Sampling rate the filter and band ranges assume
    pub sample_rate_hz: f64,
    /// Sample timestamps, shared by all axes
    pub timestamps: Vec<f64>,
    pub axes: BTreeMap<Axis, AxisAnalysis>,
    pub metrics: ProcessingMetrics,
}

/// Compact per-axis digest for logs and dashboards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSummary {
    pub rms: f64,
    /// `None` for a constant signal
    pub kurtosis: Option<f64>,
    pub peak: f64,
    pub crest_factor: Option<f64>,
    pub dominant_frequency_hz: f64,
    /// Result level of the most energetic band
    pub dominant_band: usize,
    /// Frequency range of that band (Hz)
    pub dominant_band_hz: (f64, f64),
    /// Energy per band, approximation first
    pub band_energies: Vec<f64>,
}

/// Compact digest of a cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub cycle: u64,
    pub completed_at: DateTime<Utc>,
    pub samples: usize,
    pub processing_time_us: u64,
    pub axes: BTreeMap<Axis, AxisSummary>,
}

impl CycleResult {
    /// Analysis for one axis
    pub fn axis(&self, axis: Axis) -> Option<&AxisAnalysis> {
        self.axes.get(&axis)
    }

    /// Samples per axis
    pub fn sample_count(&self) -> usize {
        self.timestamps.len()
    }

    /// Digest without the signal and coefficient arrays
    pub fn summary(&self) -> CycleSummary {
        let axes = self
            .axes
            .iter()
            .map(|(axis, analysis)| {
                let stats = &analysis.stats;
                let (dominant_band, dominant_band_hz) = analysis
                    .decomposition
                    .dominant_band()
                    .map(|band| (band.level, band.frequency_range(self.sample_rate_hz)))
                    .unwrap_or((0, (0.0, 0.0)));

                let summary = AxisSummary {
                    rms: stats.rms,
                    kurtosis: stats.has_kurtosis().then_some(stats.kurtosis),
                    peak: stats.peak,
                    crest_factor: (!stats.crest_factor.is_nan()).then_some(stats.crest_factor),
                    dominant_frequency_hz: stats.dominant_frequency_hz,
                    dominant_band,
                    dominant_band_hz,
                    band_energies: analysis.decomposition.band_energies(),
                };
                (*axis, summary)
            })
            .collect();

        CycleSummary {
            cycle: self.cycle,
            completed_at: self.completed_at,
            samples: self.sample_count(),
            processing_time_us: self.metrics.processing_time_us,
            axes,
        }
    }
}

/// Filter, statistics and decomposition stages built from one configuration
#[derive(Debug, Clone)]
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    filter: BandFilter,
    decomposer: WaveletDecomposer,
    extractor: FeatureExtractor,
}

impl AnalysisPipeline {
    /// Validate the configuration and prepare all stages
    pub fn new(config: AnalysisConfig) -> VibResult<Self> {
        config.validate()?;

        let filter = BandFilter::new(config.filter.clone())?;
        let decomposer = WaveletDecomposer::new(&config.wavelet, config.decomposition_levels)?;
        let extractor = FeatureExtractor::new(config.filter.sample_rate_hz);

        Ok(Self {
            config,
            filter,
            decomposer,
            extractor,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn filter(&self) -> &BandFilter {
        &self.filter
    }

    pub fn decomposer(&self) -> &WaveletDecomposer {
        &self.decomposer
    }

    /// Fewest samples a cycle can run on
    pub fn min_samples(&self) -> usize {
        self.filter.min_input_len().max(self.decomposer.min_signal_len())
    }

    /// Run one analysis cycle over all three axes
    pub fn run_cycle(&self, cycle: u64, snapshot: &SampleSnapshot) -> VibResult<CycleResult> {
        let mut timer = ProcessingMetrics::start_timing();
        timer.set_input_samples(snapshot.len());

        let configured_hz = self.config.filter.sample_rate_hz;
        if let Some(estimated_hz) = snapshot.estimated_sample_rate() {
            if (estimated_hz - configured_hz).abs() > RATE_TOLERANCE * configured_hz {
                warn!(cycle, estimated_hz, configured_hz, "sample timestamps disagree with the configured rate");
            }
        }

        let mut axes = BTreeMap::new();
        for (axis, signal) in Axis::ALL.into_iter().zip(snapshot.all_channels()) {
            match self.analyze_axis(&signal) {
                Ok(analysis) => {
                    axes.insert(axis, analysis);
                }
                Err(e) => {
                    debug!(cycle, %axis, error = %e, "axis analysis failed");
                    return Err(e);
                }
            }
        }

        Ok(CycleResult {
            cycle,
            snapshot_id: snapshot.id,
            completed_at: Utc::now(),
            sample_rate_hz: self.config.filter.sample_rate_hz,
            timestamps: snapshot.timestamps(),
            axes,
            metrics: timer.finish(),
        })
    }

    /// Filter one axis, then extract statistics and decompose the filtered signal
    pub fn analyze_axis(&self, signal: &[f64]) -> VibResult<AxisAnalysis> {
        let filtered = self.filter.process(signal)?;
        let stats = self.extractor.extract(&filtered)?;
        let decomposition = self.decomposer.decompose(&filtered)?;

        Ok(AxisAnalysis {
            filtered,
            stats,
            decomposition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use vib_core::{Sample, VibError};

    fn snapshot(n: usize) -> SampleSnapshot {
        let samples = (0..n)
            .map(|i| {
                let t = i as f64 / 1000.0;
                Sample::new(
                    t,
                    (2.0 * PI * 5.0 * t).sin(),
                    0.5 * (2.0 * PI * 12.0 * t).sin(),
                    9.81 + 0.2 * (2.0 * PI * 8.0 * t).cos(),
                )
                .unwrap()
            })
            .collect();
        SampleSnapshot::new(samples)
    }

    #[test]
    fn test_pipeline_rejects_invalid_config() {
        let mut config = AnalysisConfig::default();
        config.filter.highpass_cutoff_hz = 30.0;
        assert!(matches!(AnalysisPipeline::new(config), Err(VibError::InvalidSpec { .. })));
    }

    #[test]
    fn test_min_samples() {
        let pipeline = AnalysisPipeline::new(AnalysisConfig::default()).unwrap();
        // order 5 filter needs 19, haar at depth 3 needs 8
        assert_eq!(pipeline.min_samples(), 19);

        let mut config = AnalysisConfig::default();
        config.wavelet = "db4".to_string();
        let pipeline = AnalysisPipeline::new(config).unwrap();
        assert_eq!(pipeline.min_samples(), 56);
    }

    #[test]
    fn test_run_cycle() {
        let pipeline = AnalysisPipeline::new(AnalysisConfig::default()).unwrap();
        let snapshot = snapshot(100);
        let result = pipeline.run_cycle(7, &snapshot).unwrap();

        assert_eq!(result.cycle, 7);
        assert_eq!(result.snapshot_id, snapshot.id);
        assert_eq!(result.sample_count(), 100);
        assert_eq!(result.axes.len(), 3);
        assert!(result.metrics.success);

        for axis in Axis::ALL {
            let analysis = result.axis(axis).unwrap();
            assert_eq!(analysis.filtered.len(), 100);
            assert_eq!(analysis.decomposition.bands.len(), 4);
            assert!(analysis.stats.rms >= 0.0);
        }

        // Gravity offset on Z is removed by the high-pass stage
        let z = result.axis(Axis::Z).unwrap();
        let mean = z.filtered.iter().sum::<f64>() / z.filtered.len() as f64;
        assert!(mean.abs() < 0.5);
    }

    #[test]
    fn test_short_snapshot_fails_whole_cycle() {
        let pipeline = AnalysisPipeline::new(AnalysisConfig::default()).unwrap();
        let result = pipeline.run_cycle(1, &snapshot(10));

        assert!(matches!(result, Err(VibError::InvalidSpec { .. })));
    }

    #[test]
    fn test_stalled_timestamps_still_analysed() {
        let pipeline = AnalysisPipeline::new(AnalysisConfig::default()).unwrap();
        let samples = (0..100)
            .map(|i| Sample::new(3.0, (i as f64 * 0.1).sin(), 0.0, 9.81).unwrap())
            .collect();

        let result = pipeline.run_cycle(1, &SampleSnapshot::new(samples)).unwrap();
        assert_eq!(result.sample_count(), 100);
        assert_eq!(result.sample_rate_hz, 1000.0);
    }

    #[test]
    fn test_summary() {
        let pipeline = AnalysisPipeline::new(AnalysisConfig::default()).unwrap();
        let result = pipeline.run_cycle(1, &snapshot(100)).unwrap();
        let summary = result.summary();

        assert_eq!(summary.samples, 100);
        let x = &summary.axes[&Axis::X];
        assert_eq!(x.band_energies.len(), 4);
        assert!(x.kurtosis.is_some());
        assert_eq!(x.dominant_band, 0);

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"X\""));
    }
}
