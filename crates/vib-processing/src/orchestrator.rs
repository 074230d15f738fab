//! PipelineOrchestrator: acquisition and analysis session lifecycle
//!
//! ```text
//!              start(config, source)
//!   Idle ───────────────────────────────▶ Running
//!    ▲                                       │
//!    └──── stop() | source EOF | source failure
//! ```
//!
//! A running session owns two tasks that share only the [`SampleBuffer`]:
//!
//! - ingestion reads records from the source, validates them and pushes
//!   samples; it races every read against the session's cancellation token
//! - analysis wakes on a fixed interval, snapshots the buffer and runs one
//!   [`AnalysisPipeline`] cycle on the blocking pool; late ticks are
//!   skipped, never queued
//!
//! Results, failures and state changes are broadcast as [`PipelineEvent`]s.
//! Publishing never waits for subscribers; a lagging subscriber loses the
//! oldest events.

use crate::config::AnalysisConfig;
use crate::pipeline::{AnalysisPipeline, CycleResult};
use crate::processor::ProcessingMetrics;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use vib_core::{validation_error, SampleBuffer, SampleSource, SourceEvent, VibError, VibResult};

/// Orchestrator lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    /// No acquisition in progress
    Idle,
    /// Acquisition and analysis loop active
    Running,
}

/// How a failed cycle should be treated by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureSeverity {
    /// Likely to clear on a later cycle
    Transient,
    /// Will fail every cycle until the pipeline is reconfigured
    Configuration,
}

impl FailureSeverity {
    pub fn of(error: &VibError) -> Self {
        if error.is_configuration() {
            FailureSeverity::Configuration
        } else {
            FailureSeverity::Transient
        }
    }
}

/// Everything the orchestrator reports to consumers
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    StateChanged(PipelineState),
    /// A completed analysis cycle
    Cycle(Arc<CycleResult>),
    /// Not enough samples buffered yet
    CycleSkipped { available: usize, required: usize },
    CycleFailed {
        cycle: u64,
        error: VibError,
        severity: FailureSeverity,
        metrics: ProcessingMetrics,
    },
    /// A record was dropped during ingestion
    SampleRejected { error: VibError },
    /// The source has no more data
    SourceExhausted { source_name: String },
    /// The source failed and the session ended
    SourceFailed { error: VibError },
}

/// Counters for the current or most recent session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorStats {
    pub samples_accepted: u64,
    pub samples_rejected: u64,
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub cycles_skipped: u64,
}

#[derive(Debug, Default)]
struct SessionCounters {
    samples_accepted: AtomicU64,
    samples_rejected: AtomicU64,
    cycles_completed: AtomicU64,
    cycles_failed: AtomicU64,
    cycles_skipped: AtomicU64,
}

impl SessionCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> OrchestratorStats {
        OrchestratorStats {
            samples_accepted: self.samples_accepted.load(Ordering::Relaxed),
            samples_rejected: self.samples_rejected.load(Ordering::Relaxed),
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            cycles_skipped: self.cycles_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Handles shared by the tasks of one session
#[derive(Clone)]
struct SessionContext {
    buffer: Arc<SampleBuffer>,
    events: broadcast::Sender<PipelineEvent>,
    state: watch::Sender<PipelineState>,
    counters: Arc<SessionCounters>,
    cancel: CancellationToken,
}

impl SessionContext {
    fn publish(&self, event: PipelineEvent) {
        // Err only means nobody is subscribed
        let _ = self.events.send(event);
    }

    fn set_state(&self, state: PipelineState) {
        let previous = self.state.send_replace(state);
        if previous != state {
            info!(?state, "pipeline state changed");
            self.publish(PipelineEvent::StateChanged(state));
        }
    }

    fn accept(&self, record: &Value) {
        match self.buffer.push_record(record) {
            Ok(_) => SessionCounters::bump(&self.counters.samples_accepted),
            Err(error) => self.reject(error),
        }
    }

    fn reject(&self, error: VibError) {
        SessionCounters::bump(&self.counters.samples_rejected);
        warn!(error = %error, "sample rejected");
        self.publish(PipelineEvent::SampleRejected { error });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IngestOutcome {
    Cancelled,
    Exhausted,
    Failed,
}

struct Session {
    config: Arc<AnalysisConfig>,
    buffer: Arc<SampleBuffer>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Starts, supervises and stops acquisition sessions
pub struct PipelineOrchestrator {
    events: broadcast::Sender<PipelineEvent>,
    state: watch::Sender<PipelineState>,
    counters: Arc<SessionCounters>,
    session: Option<Session>,
}

impl PipelineOrchestrator {
    /// Create an idle orchestrator buffering `event_capacity` events per subscriber
    pub fn new(event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        let (state, _) = watch::channel(PipelineState::Idle);

        Self {
            events,
            state,
            counters: Arc::new(SessionCounters::default()),
            session: None,
        }
    }

    /// Subscribe to pipeline events
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }

    /// Watch lifecycle state changes
    pub fn watch_state(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Current lifecycle state
    pub fn state(&self) -> PipelineState {
        *self.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state() == PipelineState::Running
    }

    /// Counters of the current or most recent session
    pub fn stats(&self) -> OrchestratorStats {
        self.counters.snapshot()
    }

    /// Configuration of the current session
    pub fn config(&self) -> Option<Arc<AnalysisConfig>> {
        self.session.as_ref().map(|s| s.config.clone())
    }

    /// Buffer of the current session
    pub fn buffer(&self) -> Option<Arc<SampleBuffer>> {
        self.session.as_ref().map(|s| s.buffer.clone())
    }

    /// Validate the configuration and begin acquisition
    ///
    /// Must be called from within a Tokio runtime. Configuration errors are
    /// returned here and leave the orchestrator idle.
    pub fn start<S: SampleSource>(&mut self, config: AnalysisConfig, source: S) -> VibResult<()> {
        self.reap_finished();
        if self.session.is_some() {
            return Err(VibError::InvalidState {
                reason: "pipeline is already running, stop it before starting again".to_string(),
            });
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|e| VibError::InvalidState {
            reason: format!("no Tokio runtime available: {}", e),
        })?;

        let pipeline = AnalysisPipeline::new(config.clone())?;
        let buffer = Arc::new(SampleBuffer::new(config.buffer_capacity)?);
        let cancel = CancellationToken::new();
        self.counters = Arc::new(SessionCounters::default());

        let ctx = SessionContext {
            buffer: buffer.clone(),
            events: self.events.clone(),
            state: self.state.clone(),
            counters: self.counters.clone(),
            cancel: cancel.clone(),
        };

        info!(
            source = source.source_name(),
            config = %config.name,
            capacity = config.buffer_capacity,
            wavelet = %config.wavelet,
            levels = config.decomposition_levels,
            "starting vibration pipeline"
        );
        ctx.set_state(PipelineState::Running);

        let handle = runtime.spawn(run_session(source, pipeline, ctx));
        self.session = Some(Session {
            config: Arc::new(config),
            buffer,
            cancel,
            handle,
        });

        Ok(())
    }

    /// Cancel the running session and wait for both tasks to finish
    ///
    /// Returns immediately when idle.
    pub async fn stop(&mut self) -> VibResult<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        info!("stopping vibration pipeline");
        session.cancel.cancel();
        let joined = session.handle.await;

        if self.state() != PipelineState::Idle {
            let _ = self.state.send_replace(PipelineState::Idle);
            let _ = self.events.send(PipelineEvent::StateChanged(PipelineState::Idle));
        }

        joined.map_err(|e| {
            error!(error = %e, "pipeline session task failed");
            VibError::InvalidState {
                reason: format!("pipeline session task failed: {}", e),
            }
        })
    }

    /// Wait until the session ends on its own or is stopped
    pub async fn wait_idle(&self) {
        let mut state = self.watch_state();
        let _ = state.wait_for(|s| *s == PipelineState::Idle).await;
    }

    // A session that ended on EOF or source failure has published Idle as its
    // last action; its task may still be returning.
    fn reap_finished(&mut self) {
        let idle = self.state() == PipelineState::Idle;
        if self.session.as_ref().map_or(false, |s| idle || s.handle.is_finished()) {
            self.session = None;
        }
    }
}

impl Default for PipelineOrchestrator {
    fn default() -> Self {
        Self::new(AnalysisConfig::default().event_channel_capacity)
    }
}

impl Drop for PipelineOrchestrator {
    fn drop(&mut self) {
        if let Some(session) = &self.session {
            session.cancel.cancel();
        }
    }
}

/// Session supervisor: runs ingestion inline and analysis as a child task
async fn run_session<S: SampleSource>(source: S, pipeline: AnalysisPipeline, ctx: SessionContext) {
    let analysis_cancel = ctx.cancel.child_token();
    let runner = CycleRunner {
        pipeline: Arc::new(pipeline),
        ctx: ctx.clone(),
        cycle: 0,
    };
    let analysis = tokio::spawn(runner.run(analysis_cancel.clone()));

    let outcome = ingest(source, &ctx).await;
    analysis_cancel.cancel();

    match analysis.await {
        Ok(mut runner) => {
            if outcome == IngestOutcome::Exhausted {
                // Analyse what the source delivered last
                runner.run_once().await;
            }
        }
        Err(e) => error!(error = %e, "analysis task failed"),
    }

    debug!(?outcome, "pipeline session finished");
    ctx.set_state(PipelineState::Idle);
}

/// Ingestion loop; always closes the source before returning
async fn ingest<S: SampleSource>(mut source: S, ctx: &SessionContext) -> IngestOutcome {
    let source_name = source.source_name().to_string();
    info!(source = %source_name, "acquisition started");

    let outcome = loop {
        let event = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => break IngestOutcome::Cancelled,
            event = source.next_record() => event,
        };

        match event {
            Ok(SourceEvent::Record(record)) => ctx.accept(&record),
            Ok(SourceEvent::Malformed { raw, reason }) => {
                let excerpt: String = raw.chars().take(80).collect();
                ctx.reject(validation_error!("unparseable record '{}': {}", excerpt, reason));
            }
            Ok(SourceEvent::Eof) => {
                info!(source = %source_name, "source reached end of data");
                ctx.publish(PipelineEvent::SourceExhausted {
                    source_name: source_name.clone(),
                });
                break IngestOutcome::Exhausted;
            }
            Err(error) => {
                error!(source = %source_name, error = %error, "source failed, ending session");
                ctx.publish(PipelineEvent::SourceFailed { error });
                break IngestOutcome::Failed;
            }
        }
    };

    source.close().await;
    info!(
        source = %source_name,
        accepted = ctx.counters.samples_accepted.load(Ordering::Relaxed),
        rejected = ctx.counters.samples_rejected.load(Ordering::Relaxed),
        "acquisition stopped"
    );
    outcome
}

/// Periodic analysis over buffer snapshots
struct CycleRunner {
    pipeline: Arc<AnalysisPipeline>,
    ctx: SessionContext,
    cycle: u64,
}

impl CycleRunner {
    async fn run(mut self, cancel: CancellationToken) -> Self {
        let mut ticker = tokio::time::interval(self.pipeline.config().cycle_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => self.run_once().await,
            }
        }
        self
    }

    async fn run_once(&mut self) {
        let snapshot = self.ctx.buffer.snapshot();
        let available = snapshot.len();
        let required = self.pipeline.min_samples();
        if available < required {
            SessionCounters::bump(&self.ctx.counters.cycles_skipped);
            debug!(available, required, "waiting for samples");
            self.ctx.publish(PipelineEvent::CycleSkipped { available, required });
            return;
        }

        self.cycle += 1;
        let cycle = self.cycle;
        let mut timer = ProcessingMetrics::start_timing();
        timer.set_input_samples(available);

        // CPU-bound; off the async workers
        let pipeline = self.pipeline.clone();
        let outcome = tokio::task::spawn_blocking(move || pipeline.run_cycle(cycle, &snapshot))
            .await
            .unwrap_or_else(|e| {
                Err(VibError::InvalidState {
                    reason: format!("analysis cycle aborted: {}", e),
                })
            });

        match outcome {
            Ok(result) => {
                SessionCounters::bump(&self.ctx.counters.cycles_completed);
                let interval = self.pipeline.config().cycle_interval();
                if !result.metrics.within_latency(interval.as_micros() as u64) {
                    warn!(
                        cycle,
                        micros = result.metrics.processing_time_us,
                        interval_ms = interval.as_millis() as u64,
                        "cycle took longer than the cycle interval"
                    );
                }
                debug!(
                    cycle,
                    samples = available,
                    micros = result.metrics.processing_time_us,
                    "cycle completed"
                );
                self.ctx.publish(PipelineEvent::Cycle(Arc::new(result)));
            }
            Err(error) => {
                SessionCounters::bump(&self.ctx.counters.cycles_failed);
                let metrics = timer.finish_with_error(&error.to_string());
                let severity = FailureSeverity::of(&error);
                match severity {
                    FailureSeverity::Configuration => error!(
                        cycle,
                        category = error.category(),
                        error = %error,
                        "cycle failed on a configuration error, stop and reconfigure the pipeline"
                    ),
                    FailureSeverity::Transient => warn!(
                        cycle,
                        category = error.category(),
                        error = %error,
                        "cycle failed"
                    ),
                }
                self.ctx.publish(PipelineEvent::CycleFailed {
                    cycle,
                    error,
                    severity,
                    metrics,
                });
            }
        }
    }
}
