//! Error handling for the vibration pipeline
//!
//! A single error enum covers sample validation, filter and wavelet
//! configuration, statistics and source failures. Errors are `Clone` so
//! they can be published to every pipeline subscriber.

use thiserror::Error;

/// Result type alias for vibration pipeline operations
pub type VibResult<T> = Result<T, VibError>;

/// Error type for all vibration pipeline operations
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum VibError {
    /// Raw sample record is missing a field or carries a non-numeric value
    #[error("Invalid sample record: {reason}")]
    Validation {
        /// Description of the offending field
        reason: String,
    },

    /// Filter specification violates Nyquist, ordering or length constraints
    #[error("Invalid filter specification: {reason}")]
    InvalidSpec {
        /// Description of the violated constraint
        reason: String,
    },

    /// Wavelet name is not a recognised family member
    #[error("Unsupported wavelet '{name}'")]
    UnsupportedWavelet {
        /// Name that was requested
        name: String,
    },

    /// Decomposition depth exceeds what the signal length allows
    #[error("Decomposition level {requested} exceeds maximum {max_level} for a {signal_len}-sample signal")]
    InvalidLevel {
        /// Requested number of levels
        requested: usize,
        /// Deepest level the signal supports
        max_level: usize,
        /// Length of the signal being decomposed
        signal_len: usize,
    },

    /// Coefficient bands do not fit together for the inverse transform
    #[error("Cannot reconstruct signal: {reason}")]
    Reconstruction {
        /// Description of the mismatch
        reason: String,
    },

    /// A processing stage produced infinite or NaN values
    #[error("Stage '{stage}' produced non-finite output")]
    NonFinite {
        /// Name of the stage whose output overflowed
        stage: String,
    },

    /// Statistics requested on an empty signal
    #[error("Cannot compute statistics on an empty signal")]
    EmptySignal,

    /// Pipeline configuration rejected at start
    #[error("Configuration error: {reason}")]
    Configuration {
        /// Description of the configuration problem
        reason: String,
    },

    /// Data source failed and cannot continue
    #[error("Sample source '{source_name}' failed: {reason}")]
    Source {
        /// Name of the failing source
        source_name: String,
        /// Description of the failure
        reason: String,
    },

    /// Operation not allowed in the current orchestrator state
    #[error("Invalid pipeline state: {reason}")]
    InvalidState {
        /// Description of the state conflict
        reason: String,
    },
}

impl VibError {
    /// Persistent faults that will fail every cycle until the operator reconfigures
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            VibError::InvalidSpec { .. }
                | VibError::UnsupportedWavelet { .. }
                | VibError::InvalidLevel { .. }
                | VibError::Configuration { .. }
        )
    }

    /// Short stable label used in structured logs
    pub fn category(&self) -> &'static str {
        match self {
            VibError::Validation { .. } => "validation",
            VibError::InvalidSpec { .. } => "invalid_spec",
            VibError::UnsupportedWavelet { .. } => "unsupported_wavelet",
            VibError::InvalidLevel { .. } => "invalid_level",
            VibError::Reconstruction { .. } => "reconstruction",
            VibError::NonFinite { .. } => "non_finite",
            VibError::EmptySignal => "empty_signal",
            VibError::Configuration { .. } => "configuration",
            VibError::Source { .. } => "source",
            VibError::InvalidState { .. } => "invalid_state",
        }
    }
}

/// Convenience macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)+) => {
        $crate::error::VibError::Configuration {
            reason: format!($($arg)+),
        }
    };
}

/// Convenience macro for creating filter specification errors
#[macro_export]
macro_rules! spec_error {
    ($($arg:tt)+) => {
        $crate::error::VibError::InvalidSpec {
            reason: format!($($arg)+),
        }
    };
}

/// Convenience macro for creating sample validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)+) => {
        $crate::error::VibError::Validation {
            reason: format!($($arg)+),
        }
    };
}
