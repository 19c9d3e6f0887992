//! Deferred timer bridge.
//!
//! Converts a "run after delay" request into a one-shot firing whose only
//! job is to push the job onto the dispatch queue, so the time-based
//! trigger re-enters the same path immediate scheduling uses. The bridge
//! never calls into the scheduler directly; the queue is the sole
//! crossing point between the timer context and the workers.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::counters::Counters;
use crate::job::Job;
use crate::queue::DispatchQueue;

/// A single-shot timer armed for one deferred dispatch.
///
/// Armed on creation; fires exactly once. Re-arming a job replaces its
/// handle with a fresh one. The caller that armed the timer has already
/// returned by fire time, so a failed push at that point is reported only
/// through the counters and a warning.
#[derive(Debug)]
pub struct OneShotTimer {
    handle: JoinHandle<()>,
}

impl OneShotTimer {
    /// Arm a one-shot firing: sleep `delay`, then push `job` onto the
    /// queue from the timer's own execution context.
    pub(crate) fn arm<C: Send + Sync + 'static>(
        delay: Duration,
        job: Arc<Job<C>>,
        queue: DispatchQueue<C>,
        counters: Arc<Counters>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(delay_ms = delay.as_millis() as u64, "deferred timer fired");
            match queue.push(Arc::clone(&job)).await {
                Ok(()) => counters.record_deferred_dispatch(),
                Err(err) => {
                    counters.record_deferred_dispatch_failed();
                    job.reset_idle();
                    warn!(error = %err, "deferred dispatch dropped at fire time");
                }
            }
        });
        Self { handle }
    }

    /// Whether the timer has not completed its firing yet.
    pub fn is_armed(&self) -> bool {
        !self.handle.is_finished()
    }
}

// ── Tests ────────────────────────────────────────────────────────────
