//! The dispatch channel: a bounded FIFO of ready-to-run jobs.
//!
//! Producers are the scheduler's immediate path and the deferred timer
//! bridge; consumers are the pool's workers. Pushes wait at most the
//! configured admission timeout; pops block until a job arrives or every
//! producer is gone.

use std::sync::Arc;
use std::time::Duration;

use crate::error::TaskPoolError;
use crate::job::Job;

/// Producer end plus depth introspection for the dispatch channel.
///
/// Clones share the same underlying channel; FIFO order is preserved
/// across all producers.
pub struct DispatchQueue<C> {
    tx: async_channel::Sender<Arc<Job<C>>>,
    rx: async_channel::Receiver<Arc<Job<C>>>,
    push_timeout: Duration,
}

impl<C> Clone for DispatchQueue<C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
            push_timeout: self.push_timeout,
        }
    }
}

impl<C: Send + Sync + 'static> DispatchQueue<C> {
    /// Create a bounded queue with the given capacity and admission wait.
    pub fn bounded(capacity: usize, push_timeout: Duration) -> Self {
        let (tx, rx) = async_channel::bounded(capacity);
        Self {
            tx,
            rx,
            push_timeout,
        }
    }

    /// Push a job, waiting at most the admission timeout for queue space.
    ///
    /// A full queue at timeout or a closed queue both report
    /// [`TaskPoolError::FailedOperation`]; no retry is attempted.
    pub async fn push(&self, job: Arc<Job<C>>) -> Result<(), TaskPoolError> {
        match tokio::time::timeout(self.push_timeout, self.tx.send(job)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(TaskPoolError::FailedOperation("dispatch queue closed")),
            Err(_) => Err(TaskPoolError::FailedOperation("dispatch queue full")),
        }
    }

    /// Consumer end for a worker.
    pub fn receiver(&self) -> DispatchReceiver<C> {
        DispatchReceiver {
            rx: self.rx.clone(),
        }
    }

    /// Jobs currently queued.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(0)
    }
}

/// Consumer end of the dispatch channel.
///
/// Holds no producer handle, so workers popping on this end observe the
/// queue closing once the pool and any armed timers are gone.
pub struct DispatchReceiver<C> {
    rx: async_channel::Receiver<Arc<Job<C>>>,
}

impl<C> Clone for DispatchReceiver<C> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<C: Send + Sync + 'static> DispatchReceiver<C> {
    /// Pop the next job, blocking until one is available. `None` once the
    /// queue is closed and drained.
    pub async fn pop(&self) -> Option<Arc<Job<C>>> {
        self.rx.recv().await.ok()
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobState, Runnable};
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl Runnable<u32> for Noop {
        async fn run(&self, _ctx: Arc<u32>) {}
    }

    fn idle_job(tag: u32) -> Arc<Job<u32>> {
        let job = Arc::new(Job::new());
        job.bind(Arc::new(Noop), Arc::new(tag));
        job
    }

    #[tokio::test]
    async fn push_pop_preserves_fifo_order() {
        let queue: DispatchQueue<u32> =
            DispatchQueue::bounded(8, Duration::from_millis(50));
        let rx = queue.receiver();

        for tag in 0..4u32 {
            queue.push(idle_job(tag)).await.unwrap();
        }
        assert_eq!(queue.len(), 4);

        for expected in 0..4u32 {
            let job = rx.pop().await.unwrap();
            let (_, ctx) = job.begin_invocation().unwrap();
            assert_eq!(*ctx, expected);
        }
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn push_to_full_queue_times_out() {
        let queue: DispatchQueue<u32> =
            DispatchQueue::bounded(1, Duration::from_millis(10));
        queue.push(idle_job(0)).await.unwrap();

        let err = queue.push(idle_job(1)).await.unwrap_err();
        assert!(matches!(err, TaskPoolError::FailedOperation(_)));
        assert_eq!(queue.len(), 1, "the rejected job must not be queued");
    }

    #[tokio::test]
    async fn push_succeeds_once_space_frees_within_the_wait() {
        let queue: DispatchQueue<u32> =
            DispatchQueue::bounded(1, Duration::from_millis(200));
        let rx = queue.receiver();
        queue.push(idle_job(0)).await.unwrap();

        // Drain concurrently so the second push admits within its wait.
        let drain = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            rx.pop().await
        });

        queue.push(idle_job(1)).await.unwrap();
        let popped = drain.await.unwrap().unwrap();
        assert_eq!(popped.state(), JobState::Idle);
    }

    #[tokio::test]
    async fn pop_returns_none_after_producers_drop() {
        let queue: DispatchQueue<u32> =
            DispatchQueue::bounded(2, Duration::from_millis(10));
        let rx = queue.receiver();
        queue.push(idle_job(0)).await.unwrap();
        drop(queue);

        assert!(rx.pop().await.is_some(), "queued job drains first");
        assert!(rx.pop().await.is_none(), "closed and drained");
    }

    #[test]
    fn capacity_is_reported() {
        let queue: DispatchQueue<u32> =
            DispatchQueue::bounded(16, Duration::from_millis(10));
        assert_eq!(queue.capacity(), 16);
        assert!(queue.is_empty());
    }
}
