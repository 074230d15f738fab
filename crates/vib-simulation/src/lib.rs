//! VIB-Simulation: Synthetic and recorded accelerometer data
//!
//! Provides tri-axial vibration simulation and replay sources for testing
//! and development.

pub mod accel_simulator;
pub mod replay;
pub mod signal_patterns;
pub mod simulated_source;

pub use accel_simulator::*;
pub use replay::ReplaySource;
pub use signal_patterns::VibrationPattern;
pub use simulated_source::SimulatedSource;
