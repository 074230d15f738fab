//! Multi-level discrete wavelet decomposition
//!
//! Orthogonal wavelets only (Haar, Daubechies, Symlets, plus the
//! biorthogonal 1.1 pair which coincides with Haar). Signal edges use
//! half-sample symmetric extension, so each level produces
//! `floor((n + F - 1) / 2)` coefficients for a filter of length `F`.
//!
//! Band layout of a [`DecompositionResult`]:
//!
//! ```text
//! level 0      final approximation   scale L   [0, fs/2^(L+1)]
//! level 1      detail                scale L   [fs/2^(L+1), fs/2^L]
//! ...
//! level L      detail                scale 1   [fs/4, fs/2]
//! ```

use crate::wavelet_tables::*;
use serde::{Deserialize, Serialize};
use vib_core::{config_error, VibError, VibResult};

/// Wavelet names accepted by [`Wavelet::from_name`]
pub const SUPPORTED_WAVELETS: [&str; 22] = [
    "bior1.1", "db1", "db2", "db3", "db4", "db5", "db6", "db7", "db8", "db9", "db10", "haar", "rbio1.1",
    "sym2", "sym3", "sym4", "sym5", "sym6", "sym7", "sym8", "sym9", "sym10",
];

/// List of supported wavelet names
pub fn available_wavelets() -> &'static [&'static str] {
    &SUPPORTED_WAVELETS
}

/// Wavelet families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveletFamily {
    Haar,
    Daubechies,
    Symlets,
    Biorthogonal,
    ReverseBiorthogonal,
}

/// Analysis and synthesis filter bank for one wavelet
#[derive(Debug, Clone, PartialEq)]
pub struct Wavelet {
    name: String,
    family: WaveletFamily,
    dec_lo: Vec<f64>,
    dec_hi: Vec<f64>,
    rec_lo: Vec<f64>,
    rec_hi: Vec<f64>,
}

impl Wavelet {
    /// Look up a wavelet by name (case-insensitive)
    pub fn from_name(name: &str) -> VibResult<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        let (family, scaling): (WaveletFamily, &[f64]) = match normalized.as_str() {
            "haar" => (WaveletFamily::Haar, &DB1),
            "bior1.1" => (WaveletFamily::Biorthogonal, &DB1),
            "rbio1.1" => (WaveletFamily::ReverseBiorthogonal, &DB1),
            "db1" => (WaveletFamily::Daubechies, &DB1),
            "db2" => (WaveletFamily::Daubechies, &DB2),
            "db3" => (WaveletFamily::Daubechies, &DB3),
            "db4" => (WaveletFamily::Daubechies, &DB4),
            "db5" => (WaveletFamily::Daubechies, &DB5),
            "db6" => (WaveletFamily::Daubechies, &DB6),
            "db7" => (WaveletFamily::Daubechies, &DB7),
            "db8" => (WaveletFamily::Daubechies, &DB8),
            "db9" => (WaveletFamily::Daubechies, &DB9),
            "db10" => (WaveletFamily::Daubechies, &DB10),
            // Least-asymmetric solutions of order 2 and 3 are the Daubechies filters
            "sym2" => (WaveletFamily::Symlets, &DB2),
            "sym3" => (WaveletFamily::Symlets, &DB3),
            "sym4" => (WaveletFamily::Symlets, &SYM4),
            "sym5" => (WaveletFamily::Symlets, &SYM5),
            "sym6" => (WaveletFamily::Symlets, &SYM6),
            "sym7" => (WaveletFamily::Symlets, &SYM7),
            "sym8" => (WaveletFamily::Symlets, &SYM8),
            "sym9" => (WaveletFamily::Symlets, &SYM9),
            "sym10" => (WaveletFamily::Symlets, &SYM10),
            _ => {
                return Err(VibError::UnsupportedWavelet {
                    name: name.to_string(),
                })
            }
        };

        Ok(Self::from_scaling_filter(normalized, family, scaling))
    }

    /// Build the quadrature mirror bank from the reconstruction low-pass filter
    fn from_scaling_filter(name: String, family: WaveletFamily, rec_lo: &[f64]) -> Self {
        let dec_lo: Vec<f64> = rec_lo.iter().rev().copied().collect();
        let rec_hi: Vec<f64> = dec_lo
            .iter()
            .enumerate()
            .map(|(k, &c)| if k % 2 == 0 { c } else { -c })
            .collect();
        let dec_hi: Vec<f64> = rec_hi.iter().rev().copied().collect();

        Self {
            name,
            family,
            dec_lo,
            dec_hi,
            rec_lo: rec_lo.to_vec(),
            rec_hi,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> WaveletFamily {
        self.family
    }

    /// Number of taps in each filter
    pub fn filter_len(&self) -> usize {
        self.rec_lo.len()
    }

    pub fn dec_lo(&self) -> &[f64] {
        &self.dec_lo
    }

    pub fn dec_hi(&self) -> &[f64] {
        &self.dec_hi
    }

    pub fn rec_lo(&self) -> &[f64] {
        &self.rec_lo
    }

    pub fn rec_hi(&self) -> &[f64] {
        &self.rec_hi
    }

    /// Deepest useful decomposition for a signal length
    pub fn max_level(&self, signal_len: usize) -> usize {
        dwt_max_level(signal_len, self.filter_len())
    }

    /// Single-level analysis step, returns (approximation, detail)
    pub fn dwt(&self, signal: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let n = signal.len();
        if n == 0 {
            return (Vec::new(), Vec::new());
        }

        let taps = self.filter_len();
        let out_len = (n + taps - 1) / 2;
        let mut approx = Vec::with_capacity(out_len);
        let mut detail = Vec::with_capacity(out_len);

        for o in 0..out_len {
            let mut a = 0.0;
            let mut d = 0.0;
            for j in 0..taps {
                let x = signal[symmetric_index(2 * o as isize + 1 - j as isize, n)];
                a += self.dec_lo[j] * x;
                d += self.dec_hi[j] * x;
            }
            approx.push(a);
            detail.push(d);
        }

        (approx, detail)
    }

    /// Single-level synthesis step
    ///
    /// An approximation one longer than the detail is trimmed, as happens
    /// when the level above had odd length.
    pub fn idwt(&self, approx: &[f64], detail: &[f64]) -> VibResult<Vec<f64>> {
        let approx = if approx.len() == detail.len() + 1 {
            &approx[..detail.len()]
        } else {
            approx
        };
        if approx.len() != detail.len() {
            return Err(VibError::Reconstruction {
                reason: format!(
                    "approximation has {} coefficients but detail has {}",
                    approx.len(),
                    detail.len()
                ),
            });
        }

        let taps = self.filter_len();
        let out_len = (2 * approx.len() + 2).saturating_sub(taps);

        let output = (0..out_len)
            .map(|k| {
                let m = k + taps - 2;
                (0..approx.len())
                    .filter_map(|i| m.checked_sub(2 * i).filter(|&g| g < taps).map(|g| (i, g)))
                    .map(|(i, g)| approx[i] * self.rec_lo[g] + detail[i] * self.rec_hi[g])
                    .sum()
            })
            .collect();

        Ok(output)
    }
}

/// Deepest level at which the last decomposition still sees a full filter
///
/// Largest `L` with `(F - 1) * 2^L <= N`, zero when the signal is shorter than the filter.
pub fn dwt_max_level(signal_len: usize, filter_len: usize) -> usize {
    if filter_len < 2 {
        return 0;
    }
    let support = filter_len - 1;
    let mut level = 0;
    while support.checked_shl(level as u32 + 1).map_or(false, |needed| needed <= signal_len) {
        level += 1;
    }
    level
}

/// Fold an index into `[0, n)` by half-sample symmetric reflection
fn symmetric_index(i: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let folded = i.rem_euclid(period) as usize;
    if folded < n {
        folded
    } else {
        2 * n - 1 - folded
    }
}

/// Role of a coefficient band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandKind {
    Approximation,
    Detail,
}

/// Coefficients of one decomposition band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientBand {
    /// Position in the result: 0 = approximation, 1 = coarsest detail
    pub level: usize,
    pub kind: BandKind,
    /// Dyadic depth at which the band was produced
    pub scale: usize,
    /// Signed coefficients
    pub coefficients: Vec<f64>,
}

impl CoefficientBand {
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Absolute values of the coefficients
    pub fn magnitudes(&self) -> Vec<f64> {
        self.coefficients.iter().map(|c| c.abs()).collect()
    }

    /// Sum of squared coefficients
    pub fn energy(&self) -> f64 {
        self.coefficients.iter().map(|c| c * c).sum()
    }

    /// Largest coefficient magnitude
    pub fn peak_magnitude(&self) -> f64 {
        self.coefficients.iter().fold(0.0f64, |m, c| m.max(c.abs()))
    }

    /// Nominal frequency range covered by the band (Hz)
    pub fn frequency_range(&self, sample_rate_hz: f64) -> (f64, f64) {
        let upper = sample_rate_hz / 2f64.powi(self.scale as i32);
        match self.kind {
            BandKind::Approximation => (0.0, upper / 2.0),
            BandKind::Detail => (upper / 2.0, upper),
        }
    }

    /// Positions of the coefficients on the original sample axis
    pub fn time_axis(&self, signal_len: usize) -> Vec<f64> {
        match self.coefficients.len() {
            0 => Vec::new(),
            1 => vec![0.0],
            m => {
                let step = signal_len as f64 / (m - 1) as f64;
                (0..m).map(|i| i as f64 * step).collect()
            }
        }
    }
}

/// Approximation plus detail bands of one signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionResult {
    /// Wavelet used for the analysis
    pub wavelet: String,
    /// Number of detail levels
    pub levels: usize,
    /// Length of the analysed signal
    pub signal_len: usize,
    /// Approximation first, then details from coarsest to finest
    pub bands: Vec<CoefficientBand>,
}

impl DecompositionResult {
    /// Final approximation band
    pub fn approximation(&self) -> Option<&CoefficientBand> {
        self.bands.first()
    }

    /// Detail bands, coarsest first
    pub fn details(&self) -> &[CoefficientBand] {
        self.bands.get(1..).unwrap_or(&[])
    }

    /// Band at a result level
    pub fn band(&self, level: usize) -> Option<&CoefficientBand> {
        self.bands.get(level)
    }

    /// Energy of every band in result order
    pub fn band_energies(&self) -> Vec<f64> {
        self.bands.iter().map(CoefficientBand::energy).collect()
    }

    /// Band energies normalised to sum to one
    pub fn relative_energies(&self) -> Vec<f64> {
        let energies = self.band_energies();
        let total: f64 = energies.iter().sum();
        if total <= 0.0 {
            return vec![0.0; energies.len()];
        }
        energies.into_iter().map(|e| e / total).collect()
    }

    /// Band holding the most energy, approximation included
    pub fn dominant_band(&self) -> Option<&CoefficientBand> {
        self.bands.iter().max_by(|a, b| a.energy().total_cmp(&b.energy()))
    }

    /// Detail band holding the most energy
    pub fn dominant_detail(&self) -> Option<&CoefficientBand> {
        self.details().iter().max_by(|a, b| a.energy().total_cmp(&b.energy()))
    }

    /// Inverse transform back to a signal of the original length
    pub fn reconstruct(&self) -> VibResult<Vec<f64>> {
        let wavelet = Wavelet::from_name(&self.wavelet)?;
        let approx = self.approximation().ok_or_else(|| VibError::Reconstruction {
            reason: "result has no approximation band".to_string(),
        })?;

        let mut signal = approx.coefficients.clone();
        for detail in self.details() {
            signal = wavelet.idwt(&signal, &detail.coefficients)?;
        }

        if signal.len() < self.signal_len {
            return Err(VibError::Reconstruction {
                reason: format!("reconstructed {} samples, expected {}", signal.len(), self.signal_len),
            });
        }
        signal.truncate(self.signal_len);
        Ok(signal)
    }
}

/// Multi-level decomposer bound to one wavelet and depth
#[derive(Debug, Clone)]
pub struct WaveletDecomposer {
    wavelet: Wavelet,
    levels: usize,
}

impl WaveletDecomposer {
    /// Resolve the wavelet name and check the depth
    pub fn new(wavelet_kind: &str, levels: usize) -> VibResult<Self> {
        let wavelet = Wavelet::from_name(wavelet_kind)?;
        if levels == 0 {
            return Err(config_error!("decomposition needs at least one level"));
        }
        Ok(Self { wavelet, levels })
    }

    pub fn wavelet(&self) -> &Wavelet {
        &self.wavelet
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Shortest signal that supports the configured depth
    pub fn min_signal_len(&self) -> usize {
        (self.wavelet.filter_len() - 1) << self.levels
    }

    /// Split the signal into `levels` detail bands and one approximation
    pub fn decompose(&self, signal: &[f64]) -> VibResult<DecompositionResult> {
        let max_level = self.wavelet.max_level(signal.len());
        if self.levels > max_level {
            return Err(VibError::InvalidLevel {
                requested: self.levels,
                max_level,
                signal_len: signal.len(),
            });
        }

        let mut approx = signal.to_vec();
        let mut details = Vec::with_capacity(self.levels);
        for scale in 1..=self.levels {
            let (next, detail) = self.wavelet.dwt(&approx);
            details.push(CoefficientBand {
                level: 0,
                kind: BandKind::Detail,
                scale,
                coefficients: detail,
            });
            approx = next;
        }

        let mut bands = Vec::with_capacity(self.levels + 1);
        bands.push(CoefficientBand {
            level: 0,
            kind: BandKind::Approximation,
            scale: self.levels,
            coefficients: approx,
        });
        for (level, mut band) in (1..).zip(details.into_iter().rev()) {
            band.level = level;
            bands.push(band);
        }

        Ok(DecompositionResult {
            wavelet: self.wavelet.name().to_string(),
            levels: self.levels,
            signal_len: signal.len(),
            bands,
        })
    }
}

/// One-shot decomposition by wavelet name
pub fn decompose(signal: &[f64], wavelet_kind: &str, levels: usize) -> VibResult<DecompositionResult> {
    WaveletDecomposer::new(wavelet_kind, levels)?.decompose(signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, SQRT_2};

    fn test_signal(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64 / 1000.0;
                (2.0 * PI * 5.0 * t).sin() + 0.4 * (2.0 * PI * 180.0 * t).cos() + 0.05 * i as f64
            })
            .collect()
    }

    fn max_abs_error(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
    }

    #[test]
    fn test_unknown_wavelet_rejected() {
        for name in ["morlet", "db11", "sym1", ""] {
            assert!(matches!(
                Wavelet::from_name(name),
                Err(VibError::UnsupportedWavelet { .. })
            ));
        }
        assert!(matches!(decompose(&[0.0; 64], "mexh", 2), Err(VibError::UnsupportedWavelet { .. })));
    }

    #[test]
    fn test_all_supported_names_resolve() {
        for name in available_wavelets() {
            let wavelet = Wavelet::from_name(name).unwrap();
            assert_eq!(wavelet.name(), *name);
        }
        assert_eq!(Wavelet::from_name(" DB4 ").unwrap().name(), "db4");
    }

    #[test]
    fn test_filter_banks_are_orthonormal() {
        for name in available_wavelets() {
            let wavelet = Wavelet::from_name(name).unwrap();
            let sum: f64 = wavelet.rec_lo().iter().sum();
            let norm: f64 = wavelet.rec_lo().iter().map(|c| c * c).sum();
            let hi_sum: f64 = wavelet.dec_hi().iter().sum();

            assert!((sum - SQRT_2).abs() < 1e-12, "{} sum {}", name, sum);
            assert!((norm - 1.0).abs() < 1e-12, "{} norm {}", name, norm);
            assert!(hi_sum.abs() < 1e-12, "{} high-pass DC {}", name, hi_sum);
        }
    }

    #[test]
    fn test_symlet_orientation() {
        let sym4 = Wavelet::from_name("sym4").unwrap();
        assert!((sym4.rec_lo()[0] - 0.0322231006040427).abs() < 1e-12);
        assert_eq!(sym4.family(), WaveletFamily::Symlets);
    }

    #[test]
    fn test_haar_single_level() {
        let haar = Wavelet::from_name("haar").unwrap();
        let (approx, detail) = haar.dwt(&[1.0, 2.0, 3.0, 4.0]);

        assert!(max_abs_error(&approx, &[3.0 / SQRT_2, 7.0 / SQRT_2]) < 1e-12);
        assert!(max_abs_error(&detail, &[-1.0 / SQRT_2, -1.0 / SQRT_2]) < 1e-12);
    }

    #[test]
    fn test_band_count_and_lengths() {
        let result = decompose(&test_signal(200), "haar", 3).unwrap();

        assert_eq!(result.bands.len(), 4);
        assert_eq!(result.details().len(), 3);
        let lengths: Vec<usize> = result.bands.iter().map(CoefficientBand::len).collect();
        assert_eq!(lengths, vec![25, 25, 50, 100]);

        let approx = result.approximation().unwrap();
        assert_eq!(approx.kind, BandKind::Approximation);
        assert_eq!(result.band(1).unwrap().scale, 3);
        assert_eq!(result.band(3).unwrap().scale, 1);
    }

    #[test]
    fn test_round_trip_reconstruction() {
        for (name, n, levels) in [("haar", 200, 3), ("db4", 200, 3), ("sym5", 128, 2), ("db2", 101, 4), ("bior1.1", 64, 6)] {
            let signal = test_signal(n);
            let result = decompose(&signal, name, levels).unwrap();
            let rebuilt = result.reconstruct().unwrap();

            assert_eq!(rebuilt.len(), n);
            assert!(max_abs_error(&signal, &rebuilt) < 1e-6, "{} round trip", name);
        }
    }

    #[test]
    fn test_level_limit() {
        assert_eq!(dwt_max_level(8, 2), 3);
        assert_eq!(dwt_max_level(7, 2), 2);
        assert_eq!(dwt_max_level(200, 8), 4);
        assert_eq!(dwt_max_level(5, 8), 0);

        assert!(decompose(&test_signal(8), "haar", 3).is_ok());
        match decompose(&test_signal(7), "haar", 3) {
            Err(VibError::InvalidLevel { requested, max_level, signal_len }) => {
                assert_eq!((requested, max_level, signal_len), (3, 2, 7));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(decompose(&[], "db2", 1), Err(VibError::InvalidLevel { .. })));
    }

    #[test]
    fn test_zero_levels_rejected() {
        assert!(matches!(WaveletDecomposer::new("haar", 0), Err(VibError::Configuration { .. })));
    }

    #[test]
    fn test_min_signal_len_matches_max_level() {
        let decomposer = WaveletDecomposer::new("db4", 3).unwrap();
        let min_len = decomposer.min_signal_len();

        assert_eq!(min_len, 56);
        assert!(decomposer.decompose(&test_signal(min_len)).is_ok());
        assert!(decomposer.decompose(&test_signal(min_len - 1)).is_err());
    }

    #[test]
    fn test_frequency_ranges() {
        let result = decompose(&test_signal(200), "haar", 3).unwrap();
        let ranges: Vec<(f64, f64)> = result.bands.iter().map(|b| b.frequency_range(1000.0)).collect();

        assert_eq!(ranges, vec![(0.0, 62.5), (62.5, 125.0), (125.0, 250.0), (250.0, 500.0)]);
    }

    #[test]
    fn test_negative_coefficients_preserved() {
        let result = decompose(&test_signal(64), "db2", 2).unwrap();
        let detail = &result.details()[1];

        assert!(detail.coefficients.iter().any(|c| *c < 0.0));
        assert!(detail.magnitudes().iter().all(|m| *m >= 0.0));
        assert!((detail.peak_magnitude() - detail.magnitudes().iter().cloned().fold(0.0, f64::max)).abs() < 1e-15);
    }

    #[test]
    fn test_energy_and_dominant_band() {
        let signal: Vec<f64> = (0..256).map(|i| (2.0 * PI * 5.0 * i as f64 / 1000.0).sin()).collect();
        let result = decompose(&signal, "db4", 3).unwrap();

        let dominant = result.dominant_band().unwrap();
        assert_eq!(dominant.kind, BandKind::Approximation);
        let relative = result.relative_energies();
        assert!((relative.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(relative[0] > 0.9);
        assert!(result.dominant_detail().unwrap().kind == BandKind::Detail);
    }

    #[test]
    fn test_time_axis() {
        let band = CoefficientBand {
            level: 1,
            kind: BandKind::Detail,
            scale: 1,
            coefficients: vec![1.0, -1.0, 0.5],
        };
        assert_eq!(band.time_axis(100), vec![0.0, 50.0, 100.0]);
    }

    #[test]
    fn test_mismatched_bands_rejected() {
        let mut result = decompose(&test_signal(64), "haar", 2).unwrap();
        result.bands[1].coefficients.truncate(3);
        assert!(matches!(result.reconstruct(), Err(VibError::Reconstruction { .. })));
    }
}
