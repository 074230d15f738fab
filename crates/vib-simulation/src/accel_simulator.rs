//! Tri-axial accelerometer simulator

use crate::signal_patterns::VibrationPattern;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vib_core::{config_error, Sample, VibResult};

/// Standard gravity (m/s^2)
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Configuration for accelerometer simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelConfig {
    /// Sampling rate in Hz
    pub sample_rate_hz: f64,
    pub x: VibrationPattern,
    pub y: VibrationPattern,
    pub z: VibrationPattern,
    /// Constant offset on Z (sensor mounted upright)
    pub gravity: f64,
    /// Noise configuration
    pub noise: NoiseConfig,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

/// Sensor noise model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Gaussian noise standard deviation (0.0 = no noise)
    pub gaussian_std: f64,
    /// Probability of a single-sample spike (0.0 to 1.0)
    pub spike_probability: f64,
    /// Spike amplitude
    pub spike_amplitude: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            gaussian_std: 0.02,
            spike_probability: 0.0,
            spike_amplitude: 1.0,
        }
    }
}

impl NoiseConfig {
    /// No noise at all
    pub fn none() -> Self {
        Self {
            gaussian_std: 0.0,
            spike_probability: 0.0,
            spike_amplitude: 0.0,
        }
    }
}

impl Default for AccelConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 1000.0,
            x: VibrationPattern::Tone { frequency_hz: 5.0, amplitude: 1.0 },
            y: VibrationPattern::Imbalance { shaft_hz: 12.0, amplitude: 0.3 },
            z: VibrationPattern::Quiet,
            gravity: STANDARD_GRAVITY,
            noise: NoiseConfig::default(),
            seed: None,
        }
    }
}

impl AccelConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> VibResult<()> {
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(config_error!("sample rate must be positive, got {}", self.sample_rate_hz));
        }
        if !self.noise.gaussian_std.is_finite() || self.noise.gaussian_std < 0.0 {
            return Err(config_error!(
                "noise standard deviation must be non-negative, got {}",
                self.noise.gaussian_std
            ));
        }
        if !(0.0..=1.0).contains(&self.noise.spike_probability) {
            return Err(config_error!(
                "spike probability must be within [0, 1], got {}",
                self.noise.spike_probability
            ));
        }
        Ok(())
    }
}

/// Accelerometer simulator producing timestamped tri-axial samples
pub struct AccelSimulator {
    config: AccelConfig,
    rng: StdRng,
    normal_dist: Normal<f64>,
    sample_index: u64,
}

impl AccelSimulator {
    /// Create new simulator with configuration
    pub fn new(config: AccelConfig) -> VibResult<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let normal_dist = Normal::new(0.0, config.noise.gaussian_std)
            .map_err(|e| config_error!("Failed to create normal distribution: {}", e))?;

        Ok(Self {
            config,
            rng,
            normal_dist,
            sample_index: 0,
        })
    }

    /// Produce the next sample in the stream
    pub fn next_sample(&mut self) -> VibResult<Sample> {
        let t = self.sample_index as f64 / self.config.sample_rate_hz;
        self.sample_index += 1;

        let x = self.config.x.value_at(t) + self.noise();
        let y = self.config.y.value_at(t) + self.noise();
        let z = self.config.gravity + self.config.z.value_at(t) + self.noise();

        Sample::new(t, x, y, z)
    }

    /// Generate `count` consecutive samples
    pub fn generate(&mut self, count: usize) -> VibResult<Vec<Sample>> {
        (0..count).map(|_| self.next_sample()).collect()
    }

    /// Generate `count` consecutive samples as raw records
    pub fn generate_records(&mut self, count: usize) -> VibResult<Vec<Value>> {
        Ok(self.generate(count)?.iter().map(Sample::to_record).collect())
    }

    fn noise(&mut self) -> f64 {
        let mut noise = self.normal_dist.sample(&mut self.rng);

        // Impacts, loose mounts
        if self.config.noise.spike_probability > 0.0 && self.rng.gen::<f64>() < self.config.noise.spike_probability {
            noise += self.config.noise.spike_amplitude * self.rng.gen_range(-1.0..1.0);
        }

        noise
    }

    /// Samples produced so far
    pub fn samples_generated(&self) -> u64 {
        self.sample_index
    }

    /// Get current configuration
    pub fn config(&self) -> &AccelConfig {
        &self.config
    }
}
