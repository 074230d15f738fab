//! Monitor session: runs the orchestrator until Ctrl+C, a deadline, or the end of the source

use crate::report::CycleReporter;
use anyhow::{Context, Result};
use std::io::Write;
use std::time::Duration;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{info, warn};
use vib_core::SampleSource;
use vib_processing::{AnalysisConfig, OrchestratorStats, PipelineOrchestrator, PipelineState};

/// Main application state
pub struct MonitorApp<W: Write> {
    config: AnalysisConfig,
    reporter: CycleReporter<W>,
    duration: Option<Duration>,
}

impl<W: Write> MonitorApp<W> {
    pub fn new(config: AnalysisConfig, reporter: CycleReporter<W>, duration: Option<Duration>) -> Self {
        Self {
            config,
            reporter,
            duration,
        }
    }

    pub fn reporter(&self) -> &CycleReporter<W> {
        &self.reporter
    }

    /// Run one acquisition session to completion
    ///
    /// The orchestrator is always stopped before returning, including when
    /// reporting fails.
    pub async fn run<S: SampleSource>(&mut self, source: S) -> Result<OrchestratorStats> {
        let mut orchestrator = PipelineOrchestrator::new(self.config.event_channel_capacity);
        let mut events = orchestrator.subscribe();
        let mut state = orchestrator.watch_state();

        orchestrator
            .start(self.config.clone(), source)
            .context("failed to start pipeline")?;

        let deadline = self.duration;
        let deadline = async move {
            match deadline {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let outcome: Result<()> = loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Received Ctrl+C, shutting down...");
                    break Ok(());
                }
                _ = &mut deadline => {
                    info!("Run duration elapsed, shutting down...");
                    break Ok(());
                }
                changed = state.changed() => {
                    if changed.is_err() || *state.borrow() == PipelineState::Idle {
                        info!("Acquisition session ended");
                        break Ok(());
                    }
                }
                event = events.recv() => match event {
                    Ok(event) => {
                        if let Err(e) = self.reporter.handle(&event) {
                            break Err(e);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Reporting fell behind, {} events dropped", skipped);
                    }
                    Err(RecvError::Closed) => break Ok(()),
                }
            }
        };

        orchestrator.stop().await.context("failed to stop pipeline")?;
        outcome?;

        // The final cycle of an exhausted source is published just before the state flips
        loop {
            match events.try_recv() {
                Ok(event) => self.reporter.handle(&event)?,
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }

        Ok(orchestrator.stats())
    }
}
