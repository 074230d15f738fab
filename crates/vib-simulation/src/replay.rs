//! Replay of recorded samples
//!
//! Records are pre-loaded and handed out in order with an optional delay
//! between them. Text input is newline-delimited JSON; lines that do not
//! parse are kept and surface as [`SourceEvent::Malformed`].

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use vib_core::{Sample, SampleSource, SourceEvent, VibError, VibResult};

/// Replays pre-loaded records with optional inter-record delay.
pub struct ReplaySource {
    events: std::vec::IntoIter<SourceEvent>,
    delay: Duration,
    yielded_first: bool,
    name: String,
}

impl ReplaySource {
    pub fn from_records(records: Vec<Value>) -> Self {
        Self::from_events(records.into_iter().map(SourceEvent::Record).collect(), "replay")
    }

    pub fn from_samples(samples: &[Sample]) -> Self {
        Self::from_records(samples.iter().map(Sample::to_record).collect())
    }

    /// Parse newline-delimited JSON, skipping blank lines
    pub fn from_json_lines(text: &str) -> Self {
        Self::from_events(text.lines().filter_map(SourceEvent::from_line).collect(), "replay")
    }

    /// Load a newline-delimited JSON recording
    pub async fn from_file(path: impl AsRef<Path>) -> VibResult<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(|e| VibError::Source {
            source_name: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut source = Self::from_json_lines(&text);
        source.name = format!("replay:{}", path.display());
        Ok(source)
    }

    fn from_events(events: Vec<SourceEvent>, name: &str) -> Self {
        Self {
            events: events.into_iter(),
            delay: Duration::ZERO,
            yielded_first: false,
            name: name.to_string(),
        }
    }

    /// Pause between records
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Records not yet replayed
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[async_trait]
impl SampleSource for ReplaySource {
    async fn next_record(&mut self) -> VibResult<SourceEvent> {
        // No delay before the first record
        if self.yielded_first && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.events.next() {
            Some(event) => {
                self.yielded_first = true;
                Ok(event)
            }
            None => Ok(SourceEvent::Eof),
        }
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}
