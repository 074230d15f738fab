//! Configuration for the vibration analysis pipeline
//!
//! A configuration is immutable once a pipeline session starts. Changing
//! parameters means stopping the orchestrator and starting it again with a
//! new [`AnalysisConfig`].

use crate::filters::FilterSpec;
use crate::wavelet::{dwt_max_level, Wavelet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use vib_core::{config_error, VibError, VibResult};

/// Full pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Configuration name/profile
    pub name: String,
    /// Samples kept in the ring buffer
    pub buffer_capacity: usize,
    /// Band-limiting cascade
    pub filter: FilterSpec,
    /// Wavelet used for decomposition
    pub wavelet: String,
    /// Number of detail levels
    pub decomposition_levels: usize,
    /// Delay between analysis cycles (ms)
    pub cycle_interval_ms: u64,
    /// Events buffered per subscriber before the oldest are dropped
    pub event_channel_capacity: usize,
}

/// Presets for common monitoring targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisProfile {
    /// Low-frequency structural motion, 0.5-20 Hz band
    Structural,
    /// Rolling-element bearings, 10-400 Hz band over a longer window
    Bearing,
    /// Fast refresh with a short window
    RealTime,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            name: "structural".to_string(),
            buffer_capacity: 100,
            filter: FilterSpec::default(),
            wavelet: "bior1.1".to_string(),
            decomposition_levels: 3,
            cycle_interval_ms: 100,
            event_channel_capacity: 64,
        }
    }
}

impl AnalysisConfig {
    /// Create configuration for a profile
    pub fn for_profile(profile: AnalysisProfile) -> Self {
        match profile {
            AnalysisProfile::Structural => Self::default(),
            AnalysisProfile::Bearing => Self {
                name: "bearing".to_string(),
                buffer_capacity: 512,
                filter: FilterSpec::new(400.0, 10.0, 1000.0, 4),
                wavelet: "db4".to_string(),
                decomposition_levels: 4,
                cycle_interval_ms: 250,
                ..Self::default()
            },
            AnalysisProfile::RealTime => Self {
                name: "realtime".to_string(),
                buffer_capacity: 64,
                filter: FilterSpec::new(20.0, 0.5, 1000.0, 3),
                wavelet: "haar".to_string(),
                decomposition_levels: 3,
                cycle_interval_ms: 50,
                ..Self::default()
            },
        }
    }

    /// Delay between analysis cycles
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }

    /// Validate every field eagerly
    ///
    /// Anything that would make every cycle fail is rejected here, including
    /// a buffer too small for the filter or the decomposition depth.
    pub fn validate(&self) -> VibResult<()> {
        if self.buffer_capacity == 0 {
            return Err(config_error!("buffer capacity must be greater than 0"));
        }

        self.filter.validate()?;

        let wavelet = Wavelet::from_name(&self.wavelet)?;

        if self.decomposition_levels == 0 {
            return Err(config_error!("decomposition levels must be at least 1"));
        }

        let max_level = dwt_max_level(self.buffer_capacity, wavelet.filter_len());
        if self.decomposition_levels > max_level {
            return Err(VibError::InvalidLevel {
                requested: self.decomposition_levels,
                max_level,
                signal_len: self.buffer_capacity,
            });
        }

        if self.buffer_capacity < self.filter.min_signal_len() {
            return Err(config_error!(
                "buffer capacity {} is below the {} samples needed by an order {} filter",
                self.buffer_capacity,
                self.filter.min_signal_len(),
                self.filter.order
            ));
        }

        if self.cycle_interval_ms == 0 {
            return Err(config_error!("cycle interval must be greater than 0 ms"));
        }

        if self.event_channel_capacity == 0 {
            return Err(config_error!("event channel capacity must be greater than 0"));
        }

        Ok(())
    }

    /// Export configuration to JSON
    pub fn to_json(&self) -> VibResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| config_error!("Failed to serialize configuration: {}", e))
    }

    /// Import configuration from JSON
    pub fn from_json(json: &str) -> VibResult<Self> {
        serde_json::from_str(json).map_err(|e| config_error!("Failed to deserialize configuration: {}", e))
    }

    /// Import configuration from TOML
    pub fn from_toml_str(content: &str) -> VibResult<Self> {
        toml::from_str(content).map_err(|e| config_error!("Failed to parse TOML configuration: {}", e))
    }

    /// Load and validate a `.toml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> VibResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_error!("Failed to read {}: {}", path.display(), e))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("json") => Self::from_json(&content)?,
            _ => {
                return Err(config_error!(
                    "Unsupported configuration format for {}, expected .toml or .json",
                    path.display()
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();

        assert_eq!(config.buffer_capacity, 100);
        assert_eq!(config.wavelet, "bior1.1");
        assert_eq!(config.decomposition_levels, 3);
        assert_eq!(config.cycle_interval(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_profiles_validate() {
        for profile in [AnalysisProfile::Structural, AnalysisProfile::Bearing, AnalysisProfile::RealTime] {
            let config = AnalysisConfig::for_profile(profile);
            assert!(config.validate().is_ok(), "{:?}: {:?}", profile, config.validate());
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = AnalysisConfig::default();
        config.wavelet = "morlet".to_string();
        assert!(matches!(config.validate(), Err(VibError::UnsupportedWavelet { .. })));

        let mut config = AnalysisConfig::default();
        config.filter.lowpass_cutoff_hz = 600.0;
        assert!(matches!(config.validate(), Err(VibError::InvalidSpec { .. })));

        let mut config = AnalysisConfig::default();
        config.buffer_capacity = 0;
        assert!(matches!(config.validate(), Err(VibError::Configuration { .. })));

        let mut config = AnalysisConfig::default();
        config.cycle_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_level_checked_against_capacity() {
        let mut config = AnalysisConfig::default();
        config.decomposition_levels = 7;

        match config.validate() {
            Err(VibError::InvalidLevel { requested, max_level, signal_len }) => {
                assert_eq!((requested, max_level, signal_len), (7, 6, 100));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_capacity_checked_against_filter() {
        let mut config = AnalysisConfig::default();
        config.buffer_capacity = 16;
        config.decomposition_levels = 2;

        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("19 samples"));
    }

    #[test]
    fn test_json_serialization() {
        let config = AnalysisConfig::for_profile(AnalysisProfile::Bearing);
        let json = config.to_json().unwrap();
        let restored = AnalysisConfig::from_json(&json).unwrap();

        assert_eq!(restored, config);
    }

    #[test]
    fn test_toml_with_defaults() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            wavelet = "db4"
            decomposition_levels = 2

            [filter]
            lowpass_cutoff_hz = 50.0
            "#,
        )
        .unwrap();

        assert_eq!(config.wavelet, "db4");
        assert_eq!(config.filter.lowpass_cutoff_hz, 50.0);
        assert_eq!(config.filter.highpass_cutoff_hz, 0.5);
        assert_eq!(config.buffer_capacity, 100);
        assert!(config.validate().is_ok());

        assert!(AnalysisConfig::from_toml_str("buffer_capacity = \"lots\"").is_err());
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let error = AnalysisConfig::from_file("pipeline.yaml").unwrap_err();
        assert!(matches!(error, VibError::Configuration { .. }));
    }
}
