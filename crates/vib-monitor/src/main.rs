//! VIB Monitor - Streaming tri-axial vibration analysis

mod app;
mod report;
mod tcp_source;
mod ws_source;

use anyhow::{Context, Result};
use app::MonitorApp;
use clap::{Parser, ValueEnum};
use report::{CycleReporter, ReportMode};
use std::path::PathBuf;
use std::time::Duration;
use tcp_source::TcpJsonSource;
use tracing::info;
use ws_source::WebSocketSource;
use vib_processing::{AnalysisConfig, AnalysisProfile};
use vib_simulation::{AccelConfig, ReplaySource, SimulatedSource, VibrationPattern};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "vib-monitor")]
#[command(about = "Band-limited wavelet analysis of streaming accelerometer data")]
#[command(version)]
struct Cli {
    /// Pipeline configuration file (.toml or .json)
    #[arg(short, long, env = "VIB_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Built-in profile used when no configuration file is given
    #[arg(long, value_enum, default_value_t = ProfileArg::Structural)]
    profile: ProfileArg,

    /// Where samples come from
    #[arg(long, value_enum, default_value_t = SourceKind::Simulate)]
    source: SourceKind,

    /// Sensor gateway for --source ws, one JSON record per message
    #[arg(long, value_name = "URL", default_value = "ws://192.168.1.1:80")]
    url: String,

    /// Newline-delimited JSON sample stream for --source tcp
    #[arg(long, value_name = "HOST:PORT", default_value = "127.0.0.1:9000")]
    address: String,

    /// Recording for --source replay, one JSON record per line
    #[arg(long, value_name = "FILE")]
    replay_file: Option<PathBuf>,

    /// Delay between replayed records in milliseconds (0 = as fast as possible)
    #[arg(long, default_value_t = 1)]
    replay_delay_ms: u64,

    /// Vibration preset on the X axis for --source simulate
    #[arg(long, default_value = "tone-5hz")]
    pattern: String,

    /// Simulator seed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many seconds
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Print one summary JSON object per cycle on stdout
    #[arg(long)]
    json: bool,

    /// Override the low-pass cutoff (Hz)
    #[arg(long)]
    lowpass_hz: Option<f64>,

    /// Override the high-pass cutoff (Hz)
    #[arg(long)]
    highpass_hz: Option<f64>,

    /// Override the sampling rate (Hz)
    #[arg(long)]
    sample_rate_hz: Option<f64>,

    /// Override the Butterworth order
    #[arg(long)]
    order: Option<usize>,

    /// Override the wavelet (e.g. haar, db4, sym8)
    #[arg(long)]
    wavelet: Option<String>,

    /// Override the decomposition depth
    #[arg(long)]
    levels: Option<usize>,

    /// Override the buffer capacity (samples)
    #[arg(long)]
    capacity: Option<usize>,

    /// Override the cycle interval (ms)
    #[arg(long)]
    interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    Simulate,
    Ws,
    Tcp,
    Replay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProfileArg {
    Structural,
    Bearing,
    Realtime,
}

impl From<ProfileArg> for AnalysisProfile {
    fn from(profile: ProfileArg) -> Self {
        match profile {
            ProfileArg::Structural => AnalysisProfile::Structural,
            ProfileArg::Bearing => AnalysisProfile::Bearing,
            ProfileArg::Realtime => AnalysisProfile::RealTime,
        }
    }
}

impl Cli {
    /// Configuration file or profile, with command-line overrides applied
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?,
            None => AnalysisConfig::for_profile(self.profile.into()),
        };

        if let Some(hz) = self.lowpass_hz {
            config.filter.lowpass_cutoff_hz = hz;
        }
        if let Some(hz) = self.highpass_hz {
            config.filter.highpass_cutoff_hz = hz;
        }
        if let Some(hz) = self.sample_rate_hz {
            config.filter.sample_rate_hz = hz;
        }
        if let Some(order) = self.order {
            config.filter.order = order;
        }
        if let Some(wavelet) = &self.wavelet {
            config.wavelet = wavelet.clone();
        }
        if let Some(levels) = self.levels {
            config.decomposition_levels = levels;
        }
        if let Some(capacity) = self.capacity {
            config.buffer_capacity = capacity;
        }
        if let Some(ms) = self.interval_ms {
            config.cycle_interval_ms = ms;
        }

        config.validate().context("invalid pipeline configuration")?;
        Ok(config)
    }

    fn simulated_source(&self, config: &AnalysisConfig) -> Result<SimulatedSource> {
        let pattern = VibrationPattern::preset(&self.pattern).with_context(|| {
            let names: Vec<&str> = VibrationPattern::presets().iter().map(|(name, _)| *name).collect();
            format!("unknown pattern '{}', expected one of: {}", self.pattern, names.join(", "))
        })?;

        let accel = AccelConfig {
            sample_rate_hz: config.filter.sample_rate_hz,
            x: pattern,
            seed: self.seed,
            ..AccelConfig::default()
        };
        Ok(SimulatedSource::new(accel)?.with_realtime_pacing())
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.analysis_config()?;

    info!(
        "Pipeline '{}': {}-{} Hz band at {} Hz, order {}, {} x{} levels, {} samples every {} ms",
        config.name,
        config.filter.highpass_cutoff_hz,
        config.filter.lowpass_cutoff_hz,
        config.filter.sample_rate_hz,
        config.filter.order,
        config.wavelet,
        config.decomposition_levels,
        config.buffer_capacity,
        config.cycle_interval_ms
    );

    let mode = if cli.json { ReportMode::JsonLines } else { ReportMode::Log };
    let reporter = CycleReporter::new(mode, std::io::stdout());
    let mut app = MonitorApp::new(config.clone(), reporter, cli.duration_secs.map(Duration::from_secs));

    let stats = match cli.source {
        SourceKind::Simulate => {
            let source = cli.simulated_source(&config)?;
            app.run(source).await?
        }
        SourceKind::Replay => {
            let path = cli
                .replay_file
                .as_ref()
                .context("--replay-file is required with --source replay")?;
            let source = ReplaySource::from_file(path)
                .await
                .with_context(|| format!("failed to open recording {}", path.display()))?
                .with_delay(Duration::from_millis(cli.replay_delay_ms));
            app.run(source).await?
        }
        SourceKind::Ws => {
            let source = WebSocketSource::connect(&cli.url)
                .await
                .with_context(|| format!("failed to connect to {}", cli.url))?;
            app.run(source).await?
        }
        SourceKind::Tcp => {
            let source = TcpJsonSource::connect(&cli.address)
                .await
                .with_context(|| format!("failed to connect to {}", cli.address))?;
            app.run(source).await?
        }
    };

    info!(
        "Done: {} samples accepted, {} rejected, {} cycles completed, {} failed, {} skipped",
        stats.samples_accepted,
        stats.samples_rejected,
        stats.cycles_completed,
        stats.cycles_failed,
        stats.cycles_skipped
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["vib-monitor"]).unwrap();
        assert_eq!(cli.source, SourceKind::Simulate);
        assert!(!cli.json);

        let config = cli.analysis_config().unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_cli_overrides_applied_and_validated() {
        let cli = Cli::try_parse_from([
            "vib-monitor", "--profile", "bearing", "--wavelet", "sym8", "--levels", "3", "--lowpass-hz", "300",
        ])
        .unwrap();
        let config = cli.analysis_config().unwrap();
        assert_eq!(config.wavelet, "sym8");
        assert_eq!(config.decomposition_levels, 3);
        assert_eq!(config.filter.lowpass_cutoff_hz, 300.0);
        assert_eq!(config.buffer_capacity, 512);

        let cli = Cli::try_parse_from(["vib-monitor", "--lowpass-hz", "0.2"]).unwrap();
        assert!(cli.analysis_config().is_err());
    }

    #[test]
    fn test_gateway_source_selection() {
        let cli = Cli::try_parse_from(["vib-monitor", "--source", "ws"]).unwrap();
        assert_eq!(cli.source, SourceKind::Ws);
        assert_eq!(cli.url, "ws://192.168.1.1:80");

        let cli = Cli::try_parse_from(["vib-monitor", "--source", "ws", "--url", "ws://10.0.0.7:81"]).unwrap();
        assert_eq!(cli.url, "ws://10.0.0.7:81");
    }

    #[test]
    fn test_unknown_pattern_rejected() {
        let cli = Cli::try_parse_from(["vib-monitor", "--pattern", "earthquake"]).unwrap();
        let config = cli.analysis_config().unwrap();
        let error = cli.simulated_source(&config).err().unwrap();
        assert!(error.to_string().contains("tone-5hz"));
    }
}
