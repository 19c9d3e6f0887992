//! Pool lifecycle and the scheduler entry point.
//!
//! [`TaskPool`] is an explicit context object: it owns the dispatch queue,
//! the diagnostic counters, and the worker handles, and is injected into
//! every scheduling call instead of living as a process-wide global. A
//! fresh pool per test case keeps counters from leaking across cases.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::PoolConfig;
use crate::counters::{Counters, CountersSnapshot};
use crate::error::TaskPoolError;
use crate::job::{Job, Runnable};
use crate::queue::DispatchQueue;
use crate::timer::OneShotTimer;
use crate::worker;

/// A fixed-size worker pool executing jobs immediately or after a delay.
///
/// Construction allocates the queue and counters; [`start`](Self::start)
/// spawns the workers exactly once. Scheduling between the two is the
/// pool-absent precondition violation and is rejected.
pub struct TaskPool<C> {
    config: PoolConfig,
    queue: DispatchQueue<C>,
    counters: Arc<Counters>,
    started: AtomicBool,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<C> std::fmt::Debug for TaskPool<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPool")
            .field("config", &self.config)
            .field("counters", &self.counters)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl<C: Send + Sync + 'static> TaskPool<C> {
    /// Create a pool from a validated config. Spawns nothing.
    pub fn new(config: PoolConfig) -> Result<Self, TaskPoolError> {
        config.validate()?;
        let queue = DispatchQueue::bounded(config.queue_capacity, config.push_timeout());
        Ok(Self {
            config,
            queue,
            counters: Arc::new(Counters::default()),
            started: AtomicBool::new(false),
            workers: Mutex::new(Vec::new()),
        })
    }

    /// Spawn the worker tasks.
    ///
    /// Idempotent: the first call spawns exactly the configured number of
    /// workers and returns `true`; every later call is a successful no-op
    /// returning `false`. Never more than `config.workers` workers exist.
    pub fn start(&self) -> bool {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("task pool already started, ignoring repeated start");
            return false;
        }

        let handles = worker::spawn_workers(self.config.workers, &self.queue);
        *self
            .workers
            .lock()
            .expect("worker handle lock poisoned") = handles;
        info!(
            workers = self.config.workers,
            queue_capacity = self.config.queue_capacity,
            "task pool started"
        );
        true
    }

    /// Whether [`start`](Self::start) has run.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Number of spawned workers (zero before start).
    pub fn worker_count(&self) -> usize {
        self.workers
            .lock()
            .expect("worker handle lock poisoned")
            .len()
    }

    /// Bind `callback` and `context` to `job`, overwriting any prior
    /// binding and leaving the job idle.
    ///
    /// Never fails; the caller must not re-initialize a job with a
    /// dispatch still in flight.
    pub fn initialize_job(&self, job: &Job<C>, callback: Arc<dyn Runnable<C>>, context: Arc<C>) {
        job.bind(callback, context);
        self.counters.record_initialized();
    }

    /// Schedule `job` to run on some worker: immediately when `delay` is
    /// zero, otherwise no earlier than `delay` from now.
    ///
    /// The precondition check (pool started, job initialized) runs before
    /// any queue or timer interaction. On the immediate path a full queue
    /// is a terminal [`TaskPoolError::FailedOperation`]; on the deferred
    /// path the call returns once the timer is armed, and a fire-time push
    /// failure is observable only through the counters.
    pub async fn schedule(&self, job: &Arc<Job<C>>, delay: Duration) -> Result<(), TaskPoolError> {
        if !self.is_started() {
            self.counters.record_schedule_illegal();
            return Err(TaskPoolError::IllegalOperation(
                "task pool has not been started",
            ));
        }
        if !job.is_initialized() {
            self.counters.record_schedule_illegal();
            return Err(TaskPoolError::IllegalOperation(
                "job has not been initialized",
            ));
        }

        if delay.is_zero() {
            self.dispatch_now(job).await
        } else {
            self.arm_deferred(job, delay);
            Ok(())
        }
    }

    /// Immediate branch: push onto the dispatch queue with a bounded wait.
    async fn dispatch_now(&self, job: &Arc<Job<C>>) -> Result<(), TaskPoolError> {
        job.mark_scheduled();
        match self.queue.push(Arc::clone(job)).await {
            Ok(()) => {
                self.counters.record_direct_dispatch();
                Ok(())
            }
            Err(err) => {
                job.reset_idle();
                self.counters.record_direct_dispatch_failed();
                debug!(error = %err, "immediate dispatch rejected");
                Err(err)
            }
        }
    }

    /// Deferred branch: arm the job's one-shot timer, replacing any
    /// previous handle. The fire callback re-enters the queue path from
    /// the timer's own context.
    fn arm_deferred(&self, job: &Arc<Job<C>>, delay: Duration) {
        job.mark_scheduled();
        let timer = OneShotTimer::arm(
            delay,
            Arc::clone(job),
            self.queue.clone(),
            Arc::clone(&self.counters),
        );
        job.install_timer(timer);
        self.counters.record_deferred_armed();
        debug!(delay_ms = delay.as_millis() as u64, "deferred dispatch armed");
    }

    /// Read-only copy of the diagnostic counters.
    pub fn counters(&self) -> CountersSnapshot {
        self.counters.snapshot()
    }

    /// Jobs currently waiting in the dispatch queue.
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    /// The config this pool was created with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }
}

// ── Tests ────────────────────────────────────────────────────────────
