//! Simulated accelerometer as a pipeline sample source

use crate::accel_simulator::{AccelConfig, AccelSimulator};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::debug;
use vib_core::{SampleSource, SourceEvent, VibResult};

/// Wake-ups per second when paced in real time
const PACING_TICKS_PER_SECOND: f64 = 100.0;

/// [`SampleSource`] backed by an [`AccelSimulator`]
///
/// By default records are produced as fast as they are read and the stream
/// never ends. Pacing, a sample limit and periodic corrupt records can be
/// enabled with the builder methods.
pub struct SimulatedSource {
    simulator: AccelSimulator,
    realtime: bool,
    ticker: Option<Interval>,
    max_samples: Option<u64>,
    malformed_every: Option<u64>,
    emitted: u64,
}

impl SimulatedSource {
    pub fn new(config: AccelConfig) -> VibResult<Self> {
        Ok(Self::from_simulator(AccelSimulator::new(config)?))
    }

    pub fn from_simulator(simulator: AccelSimulator) -> Self {
        Self {
            simulator,
            realtime: false,
            ticker: None,
            max_samples: None,
            malformed_every: None,
            emitted: 0,
        }
    }

    /// Deliver samples at the configured sample rate
    pub fn with_realtime_pacing(mut self) -> Self {
        self.realtime = true;
        self
    }

    /// End the stream after `count` samples
    pub fn with_max_samples(mut self, count: u64) -> Self {
        self.max_samples = Some(count);
        self
    }

    /// Replace every `n`th record with unparseable text
    pub fn with_malformed_every(mut self, n: u64) -> Self {
        self.malformed_every = (n > 0).then_some(n);
        self
    }

    /// Records handed out so far, including corrupt ones
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    fn samples_per_tick(&self) -> u64 {
        (self.simulator.config().sample_rate_hz / PACING_TICKS_PER_SECOND).ceil().max(1.0) as u64
    }

    async fn pace(&mut self) {
        if !self.realtime {
            return;
        }

        let per_tick = self.samples_per_tick();
        if self.emitted % per_tick != 0 {
            return;
        }

        let period = Duration::from_secs_f64(per_tick as f64 / self.simulator.config().sample_rate_hz);
        let ticker = self.ticker.get_or_insert_with(|| {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        ticker.tick().await;
    }
}

#[async_trait]
impl SampleSource for SimulatedSource {
    async fn next_record(&mut self) -> VibResult<SourceEvent> {
        if self.max_samples.map_or(false, |max| self.emitted >= max) {
            return Ok(SourceEvent::Eof);
        }

        self.pace().await;

        let sample = self.simulator.next_sample()?;
        self.emitted += 1;

        if let Some(n) = self.malformed_every {
            if self.emitted % n == 0 {
                // A record cut short mid-field
                let line = sample.to_record().to_string();
                let truncated = &line[..line.len() / 2];
                if let Some(event) = SourceEvent::from_line(truncated) {
                    debug!(index = self.emitted, "emitting corrupt record");
                    return Ok(event);
                }
            }
        }

        Ok(SourceEvent::Record(sample.to_record()))
    }

    async fn close(&mut self) {
        self.ticker = None;
        debug!(emitted = self.emitted, "simulated source closed");
    }

    fn source_name(&self) -> &str {
        "simulated"
    }
}
