//! Digital filters for vibration signal conditioning
//!
//! Butterworth stages are designed in the analog domain, mapped with the
//! bilinear transform (frequency prewarped) and kept in transfer-function
//! form. Stages are applied forward and backward so the output has no
//! phase delay relative to the input.

use crate::processor::SignalProcessor;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use vib_core::{spec_error, VibError, VibResult};

/// Highest filter order accepted; transfer-function form loses precision beyond it
pub const MAX_FILTER_ORDER: usize = 10;

/// Filter types supported by the framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterType {
    /// Butterworth lowpass filter
    ButterworthLowpass,
    /// Butterworth highpass filter
    ButterworthHighpass,
}

/// Band-limiting cascade parameters
///
/// The low-pass stage runs first at `lowpass_cutoff_hz`, then the high-pass
/// stage at `highpass_cutoff_hz`. Both must sit below Nyquist and the
/// high-pass cutoff must sit below the low-pass cutoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Cutoff of the low-pass stage (Hz)
    pub lowpass_cutoff_hz: f64,
    /// Cutoff of the high-pass stage (Hz)
    pub highpass_cutoff_hz: f64,
    /// Sampling rate of the input signal (Hz)
    pub sample_rate_hz: f64,
    /// Butterworth order of each stage
    pub order: usize,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            lowpass_cutoff_hz: 20.0,
            highpass_cutoff_hz: 0.5,
            sample_rate_hz: 1000.0,
            order: 5,
        }
    }
}

impl FilterSpec {
    /// Create a cascade specification
    pub fn new(lowpass_cutoff_hz: f64, highpass_cutoff_hz: f64, sample_rate_hz: f64, order: usize) -> Self {
        Self {
            lowpass_cutoff_hz,
            highpass_cutoff_hz,
            sample_rate_hz,
            order,
        }
    }

    /// Half the sampling rate
    pub fn nyquist(&self) -> f64 {
        0.5 * self.sample_rate_hz
    }

    /// Samples added at each end before zero-phase filtering
    pub fn padding_len(&self) -> usize {
        3 * (self.order + 1)
    }

    /// Shortest signal the cascade can filter
    pub fn min_signal_len(&self) -> usize {
        self.padding_len() + 1
    }

    /// Check Nyquist, positivity, order and ordering constraints
    pub fn validate(&self) -> VibResult<()> {
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(spec_error!("sample rate must be positive, got {} Hz", self.sample_rate_hz));
        }

        if self.order == 0 || self.order > MAX_FILTER_ORDER {
            return Err(spec_error!(
                "filter order must be between 1 and {}, got {}",
                MAX_FILTER_ORDER,
                self.order
            ));
        }

        let nyquist = self.nyquist();
        for (stage, cutoff) in [("low-pass", self.lowpass_cutoff_hz), ("high-pass", self.highpass_cutoff_hz)] {
            if !cutoff.is_finite() || cutoff <= 0.0 {
                return Err(spec_error!("{} cutoff must be positive, got {} Hz", stage, cutoff));
            }
            if cutoff >= nyquist {
                return Err(spec_error!(
                    "{} cutoff {} Hz must be below the Nyquist frequency {} Hz",
                    stage,
                    cutoff,
                    nyquist
                ));
            }
        }

        if self.highpass_cutoff_hz >= self.lowpass_cutoff_hz {
            return Err(spec_error!(
                "high-pass cutoff {} Hz must be below low-pass cutoff {} Hz, the cascade would pass nothing",
                self.highpass_cutoff_hz,
                self.lowpass_cutoff_hz
            ));
        }

        Ok(())
    }
}

/// IIR filter in transfer-function form, `a[0] == 1`
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    /// Numerator coefficients
    pub b: Vec<f64>,
    /// Denominator coefficients
    pub a: Vec<f64>,
}

impl TransferFunction {
    /// Design a digital Butterworth filter
    pub fn butterworth(filter_type: FilterType, order: usize, cutoff_hz: f64, sample_rate_hz: f64) -> VibResult<Self> {
        if order == 0 {
            return Err(spec_error!("filter order must be at least 1"));
        }

        // Normalized cutoff (0 to 1, where 1 is Nyquist)
        let wn = cutoff_hz / (0.5 * sample_rate_hz);
        if !(wn > 0.0 && wn < 1.0) {
            return Err(spec_error!(
                "cutoff {} Hz is outside (0, {}) Hz",
                cutoff_hz,
                0.5 * sample_rate_hz
            ));
        }

        // Pre-warp for the bilinear map with a normalized rate of 2
        let warped = 4.0 * (PI * wn / 2.0).tan();

        // Analog prototype poles on the left half of the unit circle
        let prototype: Vec<Complex64> = (0..order)
            .map(|k| Complex64::from_polar(1.0, PI * (2 * k + order + 1) as f64 / (2 * order) as f64))
            .collect();

        let (zeros, poles, gain) = match filter_type {
            FilterType::ButterworthLowpass => {
                let poles: Vec<Complex64> = prototype.iter().map(|p| *p * warped).collect();
                (Vec::new(), poles, warped.powi(order as i32))
            }
            FilterType::ButterworthHighpass => {
                let pole_product: Complex64 = prototype.iter().map(|p| -*p).product();
                let poles: Vec<Complex64> = prototype.iter().map(|p| Complex64::from(warped) / *p).collect();
                (vec![Complex64::new(0.0, 0.0); order], poles, pole_product.inv().re)
            }
        };

        Ok(Self::bilinear(&zeros, &poles, gain))
    }

    /// Map analog zeros, poles and gain to a digital transfer function
    fn bilinear(zeros: &[Complex64], poles: &[Complex64], gain: f64) -> Self {
        let fs2 = Complex64::new(4.0, 0.0);
        let map = |s: &Complex64| (fs2 + *s) / (fs2 - *s);

        let mut digital_zeros: Vec<Complex64> = zeros.iter().map(map).collect();
        let digital_poles: Vec<Complex64> = poles.iter().map(map).collect();

        // Zeros at infinity land on Nyquist
        digital_zeros.resize(digital_poles.len(), Complex64::new(-1.0, 0.0));

        let numerator: Complex64 = zeros.iter().map(|z| fs2 - *z).product();
        let denominator: Complex64 = poles.iter().map(|p| fs2 - *p).product();
        let digital_gain = gain * (numerator / denominator).re;

        Self {
            b: poly(&digital_zeros).into_iter().map(|c| c * digital_gain).collect(),
            a: poly(&digital_poles),
        }
    }

    /// Filter order (number of state variables)
    pub fn order(&self) -> usize {
        self.a.len().max(self.b.len()) - 1
    }

    /// Samples added at each end by [`filtfilt`](Self::filtfilt)
    pub fn padding_len(&self) -> usize {
        3 * self.a.len().max(self.b.len())
    }

    /// Single forward pass, direct form II transposed
    pub fn lfilter(&self, input: &[f64], initial_state: &[f64]) -> Vec<f64> {
        let n = self.order();
        let mut state = initial_state.to_vec();
        state.resize(n, 0.0);

        let b = |i: usize| self.b.get(i).copied().unwrap_or(0.0);
        let a = |i: usize| self.a.get(i).copied().unwrap_or(0.0);

        input
            .iter()
            .map(|&x| {
                let y = b(0) * x + state.first().copied().unwrap_or(0.0);
                for i in 1..n {
                    state[i - 1] = b(i) * x + state[i] - a(i) * y;
                }
                if n > 0 {
                    state[n - 1] = b(n) * x - a(n) * y;
                }
                y
            })
            .collect()
    }

    /// Initial state matching the steady-state response to a unit step
    pub fn steady_state(&self) -> VibResult<Vec<f64>> {
        let n = self.order();
        let b = |i: usize| self.b.get(i).copied().unwrap_or(0.0);
        let a = |i: usize| self.a.get(i).copied().unwrap_or(0.0);

        // (I - companion(a)^T) * zi = b[1..] - a[1..] * b[0]
        let mut system = vec![vec![0.0; n + 1]; n];
        for (i, row) in system.iter_mut().enumerate() {
            for j in 0..n {
                let companion_ji = if j == 0 {
                    -a(i + 1)
                } else if i + 1 == j {
                    1.0
                } else {
                    0.0
                };
                let identity = if i == j { 1.0 } else { 0.0 };
                row[j] = identity - companion_ji;
            }
            row[n] = b(i + 1) - a(i + 1) * b(0);
        }

        solve_linear(system).ok_or_else(|| spec_error!("filter has no steady state (pole on the unit circle)"))
    }

    /// Zero-phase forward-backward filtering
    ///
    /// The signal is extended at both ends by odd reflection, filtered
    /// forward from a steady-state start, reversed, filtered again and
    /// trimmed. Output length equals input length.
    pub fn filtfilt(&self, signal: &[f64]) -> VibResult<Vec<f64>> {
        let padlen = self.padding_len();
        let n = signal.len();
        if n <= padlen {
            return Err(spec_error!(
                "signal of {} samples is too short for zero-phase filtering at order {}, need at least {}",
                n,
                self.order(),
                padlen + 1
            ));
        }

        let zi = self.steady_state()?;
        let extended = odd_extension(signal, padlen);

        let start: Vec<f64> = zi.iter().map(|z| z * extended[0]).collect();
        let mut pass: Vec<f64> = self.lfilter(&extended, &start);
        pass.reverse();

        let start: Vec<f64> = zi.iter().map(|z| z * pass[0]).collect();
        let mut pass = self.lfilter(&pass, &start);
        pass.reverse();

        Ok(pass[padlen..padlen + n].to_vec())
    }
}

/// Expand monic polynomial coefficients from its roots
fn poly(roots: &[Complex64]) -> Vec<f64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for root in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, c) in coeffs.iter().enumerate() {
            next[i] += *c;
            next[i + 1] -= *c * *root;
        }
        coeffs = next;
    }
    coeffs.into_iter().map(|c| c.re).collect()
}

/// Reflect `padlen` samples about each endpoint
fn odd_extension(signal: &[f64], padlen: usize) -> Vec<f64> {
    let n = signal.len();
    let first = signal[0];
    let last = signal[n - 1];

    let mut extended = Vec::with_capacity(n + 2 * padlen);
    extended.extend((0..padlen).map(|i| 2.0 * first - signal[padlen - i]));
    extended.extend_from_slice(signal);
    extended.extend((0..padlen).map(|i| 2.0 * last - signal[n - 2 - i]));
    extended
}

/// Gauss-Jordan elimination with partial pivoting on an augmented matrix
fn solve_linear(mut system: Vec<Vec<f64>>) -> Option<Vec<f64>> {
    let n = system.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&r1, &r2| system[r1][col].abs().total_cmp(&system[r2][col].abs()))?;
        if system[pivot][col].abs() < 1e-14 {
            return None;
        }
        system.swap(col, pivot);

        for row in 0..n {
            if row != col {
                let factor = system[row][col] / system[col][col];
                for k in col..=n {
                    system[row][k] -= factor * system[col][k];
                }
            }
        }
    }

    Some((0..n).map(|i| system[i][n] / system[i][i]).collect())
}

/// Low-pass then high-pass zero-phase Butterworth cascade
#[derive(Debug, Clone)]
pub struct BandFilter {
    spec: FilterSpec,
    lowpass: TransferFunction,
    highpass: TransferFunction,
}

impl BandFilter {
    /// Validate the specification and design both stages
    pub fn new(spec: FilterSpec) -> VibResult<Self> {
        spec.validate()?;

        let lowpass = TransferFunction::butterworth(
            FilterType::ButterworthLowpass,
            spec.order,
            spec.lowpass_cutoff_hz,
            spec.sample_rate_hz,
        )?;
        let highpass = TransferFunction::butterworth(
            FilterType::ButterworthHighpass,
            spec.order,
            spec.highpass_cutoff_hz,
            spec.sample_rate_hz,
        )?;

        Ok(Self { spec, lowpass, highpass })
    }

    /// One-shot cascade application
    pub fn apply(signal: &[f64], spec: &FilterSpec) -> VibResult<Vec<f64>> {
        BandFilter::new(spec.clone())?.filter(signal)
    }

    /// Run both stages; fails as a whole if the signal is too short
    pub fn filter(&self, signal: &[f64]) -> VibResult<Vec<f64>> {
        if signal.len() < self.spec.min_signal_len() {
            return Err(spec_error!(
                "signal of {} samples is too short for order {} zero-phase filtering, need at least {}",
                signal.len(),
                self.spec.order,
                self.spec.min_signal_len()
            ));
        }

        let lowpassed = self.lowpass.filtfilt(signal)?;
        let filtered = self.highpass.filtfilt(&lowpassed)?;
        if filtered.iter().any(|v| !v.is_finite()) {
            return Err(VibError::NonFinite {
                stage: SignalProcessor::name(self).to_string(),
            });
        }
        Ok(filtered)
    }

    /// Specification the filter was built from
    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    /// Low-pass stage coefficients
    pub fn lowpass_stage(&self) -> &TransferFunction {
        &self.lowpass
    }

    /// High-pass stage coefficients
    pub fn highpass_stage(&self) -> &TransferFunction {
        &self.highpass
    }
}

impl SignalProcessor for BandFilter {
    fn process(&self, input: &[f64]) -> VibResult<Vec<f64>> {
        self.filter(input)
    }

    fn name(&self) -> &str {
        "butterworth_band"
    }

    fn min_input_len(&self) -> usize {
        self.spec.min_signal_len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| (2.0 * PI * freq * i as f64 / fs).sin()).collect()
    }

    fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < tol, "{} vs {}", a, e);
        }
    }

    #[test]
    fn test_butterworth_lowpass_coefficients() {
        let tf = TransferFunction::butterworth(FilterType::ButterworthLowpass, 2, 100.0, 1000.0).unwrap();

        assert_close(&tf.b, &[0.0674552738890719, 0.1349105477781438, 0.0674552738890719], 1e-12);
        assert_close(&tf.a, &[1.0, -1.142980502539901, 0.41280159809618866], 1e-12);
    }

    #[test]
    fn test_butterworth_highpass_coefficients() {
        let tf = TransferFunction::butterworth(FilterType::ButterworthHighpass, 2, 100.0, 1000.0).unwrap();

        assert_close(&tf.b, &[0.6389455251590224, -1.2778910503180447, 0.6389455251590224], 1e-12);
        assert_close(&tf.a, &[1.0, -1.142980502539901, 0.41280159809618866], 1e-12);
    }

    #[test]
    fn test_unity_dc_gain_lowpass() {
        let tf = TransferFunction::butterworth(FilterType::ButterworthLowpass, 5, 20.0, 1000.0).unwrap();
        let gain = tf.b.iter().sum::<f64>() / tf.a.iter().sum::<f64>();
        assert!((gain - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_filtfilt_constant_passthrough() {
        let tf = TransferFunction::butterworth(FilterType::ButterworthLowpass, 5, 20.0, 1000.0).unwrap();
        let output = tf.filtfilt(&vec![2.5; 100]).unwrap();

        assert_eq!(output.len(), 100);
        assert!(output.iter().all(|v| (v - 2.5).abs() < 1e-8));
    }

    #[test]
    fn test_band_filter_preserves_length_and_is_deterministic() {
        let spec = FilterSpec::default();
        let signal: Vec<f64> = sine(5.0, 1000.0, 150)
            .iter()
            .zip(sine(120.0, 1000.0, 150))
            .map(|(a, b)| a + 0.3 * b)
            .collect();

        let first = BandFilter::apply(&signal, &spec).unwrap();
        let second = BandFilter::apply(&signal, &spec).unwrap();

        assert_eq!(first.len(), signal.len());
        assert_eq!(first, second);
    }

    #[test]
    fn test_band_filter_removes_dc_offset() {
        let output = BandFilter::apply(&vec![9.81; 200], &FilterSpec::default()).unwrap();
        assert!(output.iter().all(|v| v.abs() < 1e-3));
    }

    #[test]
    fn test_lowpass_stage_attenuates_high_tone() {
        let filter = BandFilter::new(FilterSpec::default()).unwrap();
        let output = filter.lowpass_stage().filtfilt(&sine(100.0, 1000.0, 200)).unwrap();

        let interior_peak = output[20..180].iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(interior_peak < 0.05);
    }

    #[test]
    fn test_cutoff_above_nyquist_rejected() {
        let signal = sine(5.0, 1000.0, 200);

        let spec = FilterSpec::new(500.0, 0.5, 1000.0, 5);
        assert!(matches!(BandFilter::apply(&signal, &spec), Err(VibError::InvalidSpec { .. })));

        let spec = FilterSpec::new(20.0, 650.0, 1000.0, 5);
        assert!(matches!(BandFilter::apply(&signal, &spec), Err(VibError::InvalidSpec { .. })));
    }

    #[test]
    fn test_non_positive_cutoff_rejected() {
        assert!(FilterSpec::new(20.0, 0.0, 1000.0, 5).validate().is_err());
        assert!(FilterSpec::new(-1.0, 0.5, 1000.0, 5).validate().is_err());
        assert!(FilterSpec::new(20.0, 0.5, 0.0, 5).validate().is_err());
        assert!(FilterSpec::new(20.0, 0.5, 1000.0, 0).validate().is_err());
    }

    #[test]
    fn test_inverted_cutoffs_rejected() {
        let error = FilterSpec::new(0.5, 20.0, 1000.0, 5).validate().unwrap_err();
        assert!(error.to_string().contains("must be below low-pass cutoff"));
    }

    #[test]
    fn test_short_signal_rejected() {
        let spec = FilterSpec::default();
        assert_eq!(spec.min_signal_len(), 19);

        let result = BandFilter::apply(&sine(5.0, 1000.0, 18), &spec);
        assert!(matches!(result, Err(VibError::InvalidSpec { .. })));
        assert!(BandFilter::apply(&sine(5.0, 1000.0, 19), &spec).is_ok());
    }

    #[test]
    fn test_overflowing_output_rejected() {
        let filter = BandFilter::new(FilterSpec::default()).unwrap();
        let result = filter.filter(&[1e308; 64]);

        assert_eq!(
            result,
            Err(VibError::NonFinite {
                stage: "butterworth_band".to_string()
            })
        );
    }

    #[test]
    fn test_signal_processor_impl() {
        let filter = BandFilter::new(FilterSpec::default()).unwrap();

        assert_eq!(filter.name(), "butterworth_band");
        assert!(!filter.can_process(&[0.0; 10]));
        assert_eq!(filter.process(&[0.0; 40]).unwrap().len(), 40);
    }
}
