//! Engine background loop.
//!
//! Spawns a tokio task that runs the fetch → filter → reconcile → publish
//! pipeline once at startup and then on every interval tick. The loop is
//! the single writer of [`EngineState`]; everything consumers see goes out
//! through the event channel as immutable snapshots.
//!
//! Cycle discipline:
//! - at most one pipeline run in flight, enforced by an RAII guard
//! - ticks and refresh requests landing mid-run are dropped, never queued
//! - a failed cycle logs its stage and cause and leaves the accepted
//!   snapshot untouched
//! - cancellation unblocks the timer wait immediately but lets a run that
//!   is already past its fetch finish normally

use crate::config::ShellConfig;
use crate::engine::filter;
use crate::engine::reconcile;
use crate::engine::state::EngineState;
use crate::error::Result;
use crate::runtime::{EngineEvent, PipelineStage, ScheduleUpdate};
use chrono::{DateTime, Utc};
use marquee_schedule::SourceConfig;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Handle for requesting an immediate pipeline run.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    tx: mpsc::UnboundedSender<()>,
}

impl RefreshHandle {
    /// Ask the engine to run a cycle now.
    ///
    /// A request landing while a run is in flight is dropped, not queued —
    /// the schedule it wanted is the one being fetched.
    pub fn request_refresh(&self) {
        let _ = self.tx.send(());
    }
}

/// RAII guard enforcing at most one pipeline run in flight.
///
/// Acquisition flips the shared flag; dropping clears it on every exit
/// path, including early failure returns.
struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Background engine that keeps the accepted schedule synchronized.
#[derive(Debug)]
pub struct ScheduleEngine {
    /// Source selection, resolved once at startup.
    source: SourceConfig,
    /// Time between pipeline cycles.
    refresh_interval: Duration,
    /// Look-back window for non-live entries.
    grace_window: chrono::Duration,
    /// Last accepted snapshot and fetch outcome. Single writer: this loop.
    state: EngineState,
    /// Channel for publishing updates to the consumer.
    events_tx: mpsc::UnboundedSender<EngineEvent>,
    /// Re-entrancy guard shared with in-flight cycle guards.
    in_flight: Arc<AtomicBool>,
    /// Manual refresh requests.
    refresh_rx: mpsc::UnboundedReceiver<()>,
    /// Kept so `refresh_handle` can be cloned after construction.
    refresh_tx: mpsc::UnboundedSender<()>,
}

impl ScheduleEngine {
    /// Create a new engine from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ShellError::Config`] when the configuration is
    /// invalid. This is the engine's only fatal error: without a valid
    /// source descriptor no cycle can ever run, so it surfaces at startup
    /// instead of being retried.
    pub fn new(config: &ShellConfig, events_tx: mpsc::UnboundedSender<EngineEvent>) -> Result<Self> {
        config.validate()?;
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        Ok(Self {
            source: config.source.clone(),
            refresh_interval: Duration::from_secs(config.engine.refresh_interval_secs),
            grace_window: chrono::Duration::seconds(config.engine.grace_window_secs as i64),
            state: EngineState::default(),
            events_tx,
            in_flight: Arc::new(AtomicBool::new(false)),
            refresh_rx,
            refresh_tx,
        })
    }

    /// Returns a handle for requesting immediate refreshes.
    pub fn refresh_handle(&self) -> RefreshHandle {
        RefreshHandle {
            tx: self.refresh_tx.clone(),
        }
    }

    /// Returns the engine-owned state (accepted snapshot, last outcome).
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Start the engine background loop.
    ///
    /// The first cycle runs immediately; subsequent cycles follow the
    /// configured interval. The loop exits when `cancel` fires — pending
    /// timer waits unblock at once, but a cycle already running completes
    /// (or fails) normally first.
    pub fn run(mut self, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                backend = %self.source.backend.kind(),
                interval_secs = self.refresh_interval.as_secs(),
                "schedule engine started"
            );
            let mut interval = time::interval(self.refresh_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                // Pick the trigger first; the cycle itself runs outside the
                // select so cancellation can never interrupt it mid-fetch.
                let manual = tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("schedule engine cancelled");
                        break;
                    }
                    _ = interval.tick() => false,
                    Some(()) = self.refresh_rx.recv() => true,
                };
                if manual {
                    debug!("manual refresh requested");
                }

                self.run_cycle().await;
                self.drain_refresh_requests();
            }
        })
    }

    /// Execute one pipeline cycle, if none is already in flight.
    async fn run_cycle(&mut self) {
        let Some(_guard) = InFlightGuard::try_acquire(&self.in_flight) else {
            debug!("pipeline already in flight, run skipped");
            return;
        };

        let started_at = Utc::now();
        debug!(stage = %PipelineStage::Fetching, "cycle started");

        let fetched = match marquee_schedule::fetch_schedule(&self.source).await {
            Ok(entries) => entries,
            Err(e) => {
                self.record_failure(started_at, PipelineStage::Fetching, e.to_string());
                return;
            }
        };
        let fetched_count = fetched.len();
        debug!(stage = %PipelineStage::Parsing, count = fetched_count, "entries normalised");

        debug!(stage = %PipelineStage::Filtering, "filtering entries");
        let (kept, stats) = filter::filter_entries(fetched, started_at, self.grace_window);
        if kept.is_empty() {
            info!("no live or upcoming streams after filtering");
        }

        debug!(stage = %PipelineStage::Reconciling, retained = kept.len(), "reconciling against accepted snapshot");
        let (new_state, changes) = reconcile::reconcile(self.state.accepted(), kept);

        info!(
            fetched = fetched_count,
            live = stats.live,
            upcoming = stats.upcoming,
            stale = stats.stale,
            invalid = stats.invalid,
            added = changes.added.len(),
            updated = changes.updated.len(),
            removed = changes.removed.len(),
            unchanged = changes.unchanged,
            "schedule cycle complete"
        );

        let update = ScheduleUpdate {
            snapshot: Arc::new(new_state.clone()),
            changes,
            fetched_at: started_at,
        };
        let summary = update.changes.summary();
        self.state.record_success(started_at, new_state, summary);

        debug!(stage = %PipelineStage::Publishing, "publishing update");
        if self.events_tx.send(EngineEvent::Updated(update)).is_err() {
            debug!("event channel closed, update not delivered");
        }
    }

    fn record_failure(&mut self, at: DateTime<Utc>, stage: PipelineStage, message: String) {
        warn!(
            stage = %stage,
            error = %message,
            "schedule cycle failed, keeping last accepted snapshot"
        );
        self.state.record_failure(at, message.clone());
        let _ = self
            .events_tx
            .send(EngineEvent::FetchFailed { at, stage, message });
    }

    /// Refresh requests that arrived while a cycle was running wanted the
    /// schedule that was just fetched; drop them instead of queueing.
    fn drain_refresh_requests(&mut self) {
        while self.refresh_rx.try_recv().is_ok() {}
    }
}
