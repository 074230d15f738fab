//! Cycle reporting: human-readable log lines or JSON lines on a writer

use anyhow::{Context, Result};
use std::io::Write;
use tracing::{debug, info, warn};
use vib_core::Axis;
use vib_processing::{CycleResult, PipelineEvent};

/// Kurtosis above which an axis is flagged as impulsive
const IMPULSIVE_KURTOSIS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// One log line per cycle
    Log,
    /// One `CycleSummary` JSON object per line on the writer
    JsonLines,
}

/// Turns pipeline events into output
pub struct CycleReporter<W: Write> {
    mode: ReportMode,
    out: W,
    cycles_reported: u64,
}

impl<W: Write> CycleReporter<W> {
    pub fn new(mode: ReportMode, out: W) -> Self {
        Self {
            mode,
            out,
            cycles_reported: 0,
        }
    }

    pub fn cycles_reported(&self) -> u64 {
        self.cycles_reported
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn handle(&mut self, event: &PipelineEvent) -> Result<()> {
        match event {
            PipelineEvent::Cycle(result) => {
                self.report_cycle(result)?;
                self.cycles_reported += 1;
            }
            PipelineEvent::CycleSkipped { available, required } => {
                debug!("Waiting for samples: {}/{}", available, required);
            }
            PipelineEvent::SourceExhausted { source_name } => {
                info!("Source {} has no more data", source_name);
            }
            // Failures and rejections are already logged where they happen
            PipelineEvent::CycleFailed { .. }
            | PipelineEvent::SampleRejected { .. }
            | PipelineEvent::SourceFailed { .. }
            | PipelineEvent::StateChanged(_) => {}
        }
        Ok(())
    }

    fn report_cycle(&mut self, result: &CycleResult) -> Result<()> {
        match self.mode {
            ReportMode::JsonLines => {
                serde_json::to_writer(&mut self.out, &result.summary()).context("failed to encode cycle summary")?;
                writeln!(self.out).context("failed to write cycle summary")?;
                self.out.flush().context("failed to flush cycle summary")?;
            }
            ReportMode::Log => log_cycle(result),
        }
        Ok(())
    }
}

fn log_cycle(result: &CycleResult) {
    let summary = result.summary();
    let axes: Vec<String> = summary
        .axes
        .iter()
        .map(|(axis, s)| {
            let kurtosis = s.kurtosis.map_or_else(|| "n/a".to_string(), |k| format!("{:.2}", k));
            format!(
                "{} rms={:.4} kurt={} peak={:.4} f={:.1}Hz band{}={:.1}-{:.1}Hz",
                axis, s.rms, kurtosis, s.peak, s.dominant_frequency_hz, s.dominant_band, s.dominant_band_hz.0, s.dominant_band_hz.1
            )
        })
        .collect();

    info!(
        "Cycle {} ({} samples, {}us): {}",
        summary.cycle,
        summary.samples,
        summary.processing_time_us,
        axes.join(" | ")
    );

    for axis in Axis::ALL {
        if let Some(analysis) = result.axis(axis) {
            if analysis.stats.is_impulsive(IMPULSIVE_KURTOSIS) {
                warn!(
                    "Impulsive vibration on {}: kurtosis {:.2}, crest factor {:.2}",
                    axis, analysis.stats.kurtosis, analysis.stats.crest_factor
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vib_core::SampleBuffer;
    use vib_processing::{AnalysisConfig, AnalysisPipeline, CycleSummary, PipelineState};
    use vib_simulation::{AccelConfig, AccelSimulator};

    fn cycle_result(cycle: u64) -> CycleResult {
        let config = AnalysisConfig::default();
        let buffer = SampleBuffer::new(config.buffer_capacity).unwrap();
        let mut simulator = AccelSimulator::new(AccelConfig::default().with_seed(9)).unwrap();
        for sample in simulator.generate(config.buffer_capacity).unwrap() {
            buffer.push(sample);
        }
        AnalysisPipeline::new(config).unwrap().run_cycle(cycle, &buffer.snapshot()).unwrap()
    }

    #[test]
    fn test_json_lines_output() {
        let mut reporter = CycleReporter::new(ReportMode::JsonLines, Vec::new());
        reporter.handle(&PipelineEvent::StateChanged(PipelineState::Running)).unwrap();
        reporter.handle(&PipelineEvent::Cycle(Arc::new(cycle_result(1)))).unwrap();
        reporter.handle(&PipelineEvent::Cycle(Arc::new(cycle_result(2)))).unwrap();

        let text = String::from_utf8(reporter.output().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(reporter.cycles_reported(), 2);

        let summary: CycleSummary = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(summary.cycle, 2);
        assert_eq!(summary.samples, 100);
        assert_eq!(summary.axes.len(), 3);
    }

    #[test]
    fn test_log_mode_writes_nothing() {
        let mut reporter = CycleReporter::new(ReportMode::Log, Vec::new());
        reporter.handle(&PipelineEvent::Cycle(Arc::new(cycle_result(1)))).unwrap();

        assert!(reporter.output().is_empty());
        assert_eq!(reporter.cycles_reported(), 1);
    }
}
