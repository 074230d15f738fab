//! Per-axis statistics over filtered vibration signals

use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};
use vib_core::{VibError, VibResult};

/// Relative variance below which a signal is treated as constant
const ZERO_VARIANCE_RESOLUTION: f64 = 1e-15;

/// Summary statistics for one axis
///
/// `kurtosis` is excess kurtosis (normal = 0). It is NaN for a constant
/// signal, where the fourth standardized moment is undefined; check
/// [`AxisStats::has_kurtosis`] before comparing against thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisStats {
    /// Root-mean-square amplitude, always >= 0
    pub rms: f64,
    /// Excess kurtosis, NaN for zero variance
    pub kurtosis: f64,
    /// Largest absolute sample
    pub peak: f64,
    /// peak / rms, NaN when rms is zero
    pub crest_factor: f64,
    /// Frequency of the strongest non-DC spectral line (Hz)
    pub dominant_frequency_hz: f64,
}

impl AxisStats {
    /// Whether kurtosis is defined for this signal
    pub fn has_kurtosis(&self) -> bool {
        !self.kurtosis.is_nan()
    }

    /// Kurtosis above the impulsiveness threshold (3 is a common bearing-fault alarm)
    pub fn is_impulsive(&self, threshold: f64) -> bool {
        self.has_kurtosis() && self.kurtosis > threshold
    }
}

/// Computes [`AxisStats`] for signals sampled at a known rate
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    sample_rate_hz: f64,
}

impl FeatureExtractor {
    pub fn new(sample_rate_hz: f64) -> Self {
        Self { sample_rate_hz }
    }

    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }

    /// Compute all statistics; fails only on an empty signal
    pub fn extract(&self, signal: &[f64]) -> VibResult<AxisStats> {
        if signal.is_empty() {
            return Err(VibError::EmptySignal);
        }

        let rms = rms(signal);
        let peak = signal.iter().fold(0.0f64, |m, x| m.max(x.abs()));
        let crest_factor = if rms > 0.0 { peak / rms } else { f64::NAN };

        Ok(AxisStats {
            rms,
            kurtosis: kurtosis(signal),
            peak,
            crest_factor,
            dominant_frequency_hz: self.dominant_frequency(signal),
        })
    }

    /// Strongest spectral line above DC
    fn dominant_frequency(&self, signal: &[f64]) -> f64 {
        let n = signal.len();
        if n < 2 {
            return 0.0;
        }

        let fft = FftPlanner::<f64>::new().plan_fft_forward(n);
        let mut spectrum: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
        fft.process(&mut spectrum);

        let (peak_bin, peak_magnitude) = spectrum[1..=n / 2]
            .iter()
            .map(|c| c.norm())
            .enumerate()
            .fold((0, 0.0f64), |best, (i, m)| if m > best.1 { (i + 1, m) } else { best });

        // Every bin is bounded by the L1 norm; lines below this are rounding leakage
        let l1_norm: f64 = signal.iter().map(|x| x.abs()).sum();
        if peak_magnitude <= 1e-9 * l1_norm {
            return 0.0;
        }
        peak_bin as f64 * self.sample_rate_hz / n as f64
    }
}

/// sqrt(mean(x^2))
pub fn rms(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    (signal.iter().map(|x| x * x).sum::<f64>() / signal.len() as f64).sqrt()
}

/// Biased excess kurtosis `m4 / m2^2 - 3`, NaN when the variance vanishes
pub fn kurtosis(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return f64::NAN;
    }

    let n = signal.len() as f64;
    let mean = signal.iter().sum::<f64>() / n;

    // Calculate moments
    let mut m2 = 0.0;
    let mut m4 = 0.0;
    for &x in signal {
        let diff2 = (x - mean) * (x - mean);
        m2 += diff2;
        m4 += diff2 * diff2;
    }
    m2 /= n;
    m4 /= n;

    let constant = signal.iter().all(|&x| x == signal[0]);
    if constant || m2 <= (ZERO_VARIANCE_RESOLUTION * mean).powi(2) {
        return f64::NAN;
    }

    m4 / (m2 * m2) - 3.0
}
