//! VIB-Processing: Streaming analysis pipeline for tri-axial vibration data
//!
//! Zero-phase Butterworth band limiting, wavelet decomposition and per-axis
//! statistics, run periodically over buffer snapshots by the orchestrator.

pub mod config;
pub mod features;
pub mod filters;
pub mod orchestrator;
pub mod pipeline;
pub mod processor;
pub mod wavelet;
mod wavelet_tables;

pub use config::{AnalysisConfig, AnalysisProfile};
pub use features::{FeatureExtractor, AxisStats};
pub use filters::{BandFilter, FilterSpec, FilterType, TransferFunction, MAX_FILTER_ORDER};
pub use orchestrator::{
    FailureSeverity, OrchestratorStats, PipelineEvent, PipelineOrchestrator, PipelineState,
};
pub use pipeline::{AnalysisPipeline, AxisAnalysis, AxisSummary, CycleResult, CycleSummary};
pub use processor::{ProcessingMetrics, SignalProcessor};
pub use wavelet::{
    available_wavelets, decompose, BandKind, CoefficientBand, DecompositionResult, Wavelet,
    WaveletDecomposer, WaveletFamily, SUPPORTED_WAVELETS,
};
