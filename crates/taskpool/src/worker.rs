//! The worker loop: long-lived tasks consuming the dispatch queue.

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::queue::{DispatchQueue, DispatchReceiver};

/// Spawn `count` workers, each bound to the shared dispatch queue.
pub(crate) fn spawn_workers<C: Send + Sync + 'static>(
    count: usize,
    queue: &DispatchQueue<C>,
) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|id| {
            let rx = queue.receiver();
            tokio::spawn(worker_loop(id, rx))
        })
        .collect()
}

/// Block-pop from the queue and run each job's callback to completion.
///
/// A worker never pops another job until the current callback returns, so
/// at most `count` callbacks run at once. The loop only ends when the
/// queue closes, which happens when the pool and any armed timers are
/// dropped.
async fn worker_loop<C: Send + Sync + 'static>(id: usize, rx: DispatchReceiver<C>) {
    debug!(worker = id, "worker started");
    while let Some(job) = rx.pop().await {
        match job.begin_invocation() {
            Some((callback, context)) => {
                callback.run(context).await;
            }
            None => {
                // Unreachable through the scheduler, which rejects
                // uninitialized jobs before any queue interaction.
                warn!(worker = id, "dequeued a job with no callback binding");
            }
        }
    }
    debug!(worker = id, "dispatch queue closed, worker exiting");
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Job, Runnable};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct Ctx {
        hits: AtomicU32,
    }

    struct CountingHandler;

    #[async_trait]
    impl Runnable<Ctx> for CountingHandler {
        async fn run(&self, ctx: Arc<Ctx>) {
            ctx.hits.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Poll until the counter reaches `expected` or a deadline passes.
    async fn wait_for_hits(ctx: &Ctx, expected: u32) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while ctx.hits.load(Ordering::SeqCst) < expected {
            assert!(
                tokio::time::Instant::now() < deadline,
                "expected {expected} callback runs, saw {}",
                ctx.hits.load(Ordering::SeqCst)
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn workers_drain_the_queue_and_run_callbacks() {
        let queue: DispatchQueue<Ctx> =
            DispatchQueue::bounded(8, Duration::from_millis(50));
        let handles = spawn_workers(2, &queue);
        assert_eq!(handles.len(), 2);

        let ctx = Arc::new(Ctx {
            hits: AtomicU32::new(0),
        });

        for _ in 0..3 {
            let job = Arc::new(Job::new());
            job.bind(Arc::new(CountingHandler), Arc::clone(&ctx));
            job.mark_scheduled();
            queue.push(job).await.unwrap();
        }

        wait_for_hits(&ctx, 3).await;
        // Settle and confirm nothing ran twice.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(ctx.hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn workers_exit_when_the_queue_closes() {
        let queue: DispatchQueue<u32> =
            DispatchQueue::bounded(2, Duration::from_millis(10));
        let handles = spawn_workers(2, &queue);
        drop(queue);

        for handle in handles {
            tokio::time::timeout(Duration::from_secs(1), handle)
                .await
                .expect("worker should exit once the queue closes")
                .expect("worker task should not panic");
        }
    }
}
