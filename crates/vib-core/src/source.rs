//! Sample source abstraction for raw record ingestion.
//!
//! The pipeline reads raw records from a [`SampleSource`] inside a
//! `select!` with its cancellation token, so a source may block for as long
//! as it needs without delaying shutdown.

use crate::error::VibResult;
use async_trait::async_trait;
use serde_json::Value;

/// Events produced by a sample source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// A raw JSON record, not yet validated as a sample.
    Record(Value),
    /// Input that could not be parsed as JSON at all.
    Malformed {
        /// The offending input, as received.
        raw: String,
        /// Parser message.
        reason: String,
    },
    /// Source reached end of data (EOF for files, peer close for TCP).
    Eof,
}

impl SourceEvent {
    /// Parse one line of newline-delimited JSON.
    ///
    /// Blank lines yield `None`.
    pub fn from_line(line: &str) -> Option<SourceEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        Some(match serde_json::from_str::<Value>(line) {
            Ok(record) => SourceEvent::Record(record),
            Err(e) => SourceEvent::Malformed {
                raw: line.to_string(),
                reason: e.to_string(),
            },
        })
    }
}

/// Trait abstracting where raw sample records come from.
///
/// Implementations handle transport and pacing internally. Reconnection is
/// out of scope: an `Err` from [`next_record`](SampleSource::next_record)
/// ends the acquisition session.
#[async_trait]
pub trait SampleSource: Send + 'static {
    /// Read the next record from the source.
    async fn next_record(&mut self) -> VibResult<SourceEvent>;

    /// Release transport resources. Called once when acquisition ends.
    async fn close(&mut self) {}

    /// Human-readable name for logging (e.g. "simulated", "tcp://host:port").
    fn source_name(&self) -> &str;
}
