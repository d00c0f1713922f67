//! Scheduler — runs automation sweeps on a fixed cadence.
//!
//! The scheduler is an ordinary value owned by the composition root. It
//! spawns one background task that ticks every `interval` and starts a sweep
//! on each tick, unless the previous sweep is still running.
//!
//! Start and stop are serialised: a `start` issued while a `stop` is joining
//! the old loop waits for it, so at most one loop (and one sweep) exists.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;

use crate::automation_engine::SweepReport;
use crate::error::{EngineError, describe};

/// Something the scheduler can ask to run one sweep.
pub trait SweepRunner: Send + Sync + 'static {
    fn run_sweep(&self) -> impl Future<Output = Result<SweepReport, EngineError>> + Send;
}

/// Cloneable, read-only view of whether a [`Scheduler`] is running.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStatus(Arc<AtomicBool>);

impl SchedulerStatus {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

struct Running {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Periodic driver for a [`SweepRunner`].
pub struct Scheduler<R> {
    runner: Arc<R>,
    interval: Duration,
    status: SchedulerStatus,
    running: Mutex<Option<Running>>,
}

impl<R: SweepRunner> Scheduler<R> {
    /// Create a stopped scheduler.
    ///
    /// A zero `interval` is raised to one millisecond.
    pub fn new(runner: Arc<R>, interval: Duration) -> Self {
        Self {
            runner,
            interval: interval.max(Duration::from_millis(1)),
            status: SchedulerStatus::default(),
            running: Mutex::new(None),
        }
    }

    /// Handle reporting whether the loop is running.
    #[must_use]
    pub fn status(&self) -> SchedulerStatus {
        self.status.clone()
    }

    /// Start the background loop. Must be called from within a tokio runtime.
    ///
    /// Waits for a concurrent [`stop`](Self::stop) to finish first. Returns
    /// `false` when the loop was already running.
    pub async fn start(&self) -> bool {
        let mut running = self.running.lock().await;
        if running.is_some() {
            tracing::debug!("scheduler already running");
            return false;
        }

        let (shutdown, signal) = watch::channel(false);
        let task = tokio::spawn(run_loop(Arc::clone(&self.runner), self.interval, signal));
        *running = Some(Running { shutdown, task });
        self.status.0.store(true, Ordering::SeqCst);
        tracing::info!(interval_secs = self.interval.as_secs_f64(), "scheduler started");
        true
    }

    /// Stop the loop and wait for an in-flight sweep to finish.
    ///
    /// The lock is held until the loop is joined. Returns `false` when the
    /// loop was not running.
    pub async fn stop(&self) -> bool {
        let mut running = self.running.lock().await;
        let Some(Running { shutdown, task }) = running.take() else {
            tracing::info!("scheduler not running, nothing to stop");
            return false;
        };
        self.status.0.store(false, Ordering::SeqCst);

        // the loop also exits when the sender is dropped
        let _ = shutdown.send(true);
        if let Err(err) = task.await {
            tracing::warn!(%err, "scheduler task ended abnormally");
        }
        drop(running);
        tracing::info!("scheduler stopped");
        true
    }
}

/// Dropping a running scheduler aborts its loop, which in turn aborts the
/// in-flight sweep. Call [`Scheduler::stop`] to let the sweep finish.
impl<R> Drop for Scheduler<R> {
    fn drop(&mut self) {
        if let Some(Running { task, .. }) = self.running.get_mut().take() {
            task.abort();
            self.status.0.store(false, Ordering::SeqCst);
        }
    }
}

async fn run_loop<R: SweepRunner>(
    runner: Arc<R>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // holds at most one sweep; dropping the set aborts it
    let mut in_flight: JoinSet<()> = JoinSet::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                while let Some(finished) = in_flight.try_join_next() {
                    if let Err(err) = finished {
                        tracing::warn!(%err, "sweep task ended abnormally");
                    }
                }
                if !in_flight.is_empty() {
                    tracing::debug!("previous sweep still running, skipping tick");
                    continue;
                }
                let runner = Arc::clone(&runner);
                in_flight.spawn(async move { sweep_once(runner.as_ref()).await });
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    while let Some(finished) = in_flight.join_next().await {
        if let Err(err) = finished {
            tracing::warn!(%err, "sweep task ended abnormally");
        }
    }
}

async fn sweep_once<R: SweepRunner>(runner: &R) {
    match runner.run_sweep().await {
        Ok(report) => tracing::debug!(processed = report.processed, "sweep completed"),
        Err(err) => tracing::warn!(error = %describe(&err), "sweep failed"),
    }
}
