//! VIB-Core: Foundation types for tri-axial vibration monitoring
//!
//! Samples, the bounded sample buffer shared between ingestion and
//! analysis, buffer snapshots, the source abstraction and the error type.

pub mod buffer;
pub mod error;
pub mod sample;
pub mod snapshot;
pub mod source;

pub use buffer::SampleBuffer;
pub use error::{VibError, VibResult};
pub use sample::{Axis, Sample};
pub use snapshot::SampleSnapshot;
pub use source::{SampleSource, SourceEvent};
