//! Pre-defined vibration patterns for realistic simulation

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Predefined per-axis vibration patterns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VibrationPattern {
    /// No vibration
    Quiet,
    /// Pure sinusoid
    Tone { frequency_hz: f64, amplitude: f64 },
    /// Rotating unbalance: strong 1x shaft component plus a weaker 2x harmonic
    Imbalance { shaft_hz: f64, amplitude: f64 },
    /// Rolling-element defect: a decaying resonance excited once per defect period
    BearingImpacts {
        defect_hz: f64,
        resonance_hz: f64,
        amplitude: f64,
        decay_per_s: f64,
    },
    /// Slow structural sway with a tone on top
    Sway {
        sway_hz: f64,
        sway_amplitude: f64,
        tone_hz: f64,
        tone_amplitude: f64,
    },
}

impl VibrationPattern {
    /// Acceleration contribution at time `t` seconds
    pub fn value_at(&self, t: f64) -> f64 {
        match *self {
            VibrationPattern::Quiet => 0.0,

            VibrationPattern::Tone { frequency_hz, amplitude } => {
                amplitude * (2.0 * PI * frequency_hz * t).sin()
            }

            VibrationPattern::Imbalance { shaft_hz, amplitude } => {
                amplitude * (2.0 * PI * shaft_hz * t).sin()
                    + 0.3 * amplitude * (2.0 * PI * 2.0 * shaft_hz * t).sin()
            }

            VibrationPattern::BearingImpacts {
                defect_hz,
                resonance_hz,
                amplitude,
                decay_per_s,
            } => {
                if defect_hz <= 0.0 {
                    return 0.0;
                }
                let since_impact = t.rem_euclid(1.0 / defect_hz);
                amplitude * (-decay_per_s * since_impact).exp() * (2.0 * PI * resonance_hz * since_impact).sin()
            }

            VibrationPattern::Sway {
                sway_hz,
                sway_amplitude,
                tone_hz,
                tone_amplitude,
            } => {
                sway_amplitude * (2.0 * PI * sway_hz * t).sin()
                    + tone_amplitude * (2.0 * PI * tone_hz * t).sin()
            }
        }
    }

    /// Get pattern description
    pub fn description(&self) -> &'static str {
        match self {
            VibrationPattern::Quiet => "No vibration",
            VibrationPattern::Tone { .. } => "Pure tone",
            VibrationPattern::Imbalance { .. } => "Shaft imbalance",
            VibrationPattern::BearingImpacts { .. } => "Bearing defect impacts",
            VibrationPattern::Sway { .. } => "Structural sway",
        }
    }

    /// Look up a preset by name, case-insensitively
    pub fn preset(name: &str) -> Option<VibrationPattern> {
        Self::presets()
            .into_iter()
            .find(|(preset, _)| preset.eq_ignore_ascii_case(name.trim()))
            .map(|(_, pattern)| pattern)
    }

    /// Create common preset patterns
    pub fn presets() -> Vec<(&'static str, VibrationPattern)> {
        vec![
            ("quiet", VibrationPattern::Quiet),
            ("tone-5hz", VibrationPattern::Tone { frequency_hz: 5.0, amplitude: 1.0 }),
            ("imbalance", VibrationPattern::Imbalance { shaft_hz: 12.0, amplitude: 0.5 }),
            ("bearing", VibrationPattern::BearingImpacts {
                defect_hz: 7.0, resonance_hz: 180.0, amplitude: 2.0, decay_per_s: 60.0,
            }),
            ("sway", VibrationPattern::Sway {
                sway_hz: 1.2, sway_amplitude: 0.4, tone_hz: 8.0, tone_amplitude: 0.2,
            }),
        ]
    }
}

impl Default for VibrationPattern {
    fn default() -> Self {
        VibrationPattern::Quiet
    }
}
