//! The job record: the unit of schedulable work.
//!
//! A [`Job`] pairs a callback capability with an opaque caller context and
//! tracks its own lifecycle state behind a short critical section. The
//! caller owns the storage; the core only holds `Arc` clones while a
//! dispatch is in flight.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::timer::OneShotTimer;

// ── Callback capability ──────────────────────────────────────────────

/// The work a job performs when a worker invokes it.
///
/// `C` is the caller's context type; the core never interprets it beyond
/// handing it back to the callback.
#[async_trait]
pub trait Runnable<C>: Send + Sync {
    /// Run the job's work with the context it was initialized with.
    async fn run(&self, ctx: Arc<C>);
}

/// Blanket implementation so `Arc<dyn Runnable<C>>` can be used directly.
#[async_trait]
impl<C, T> Runnable<C> for Arc<T>
where
    C: Send + Sync + 'static,
    T: Runnable<C> + ?Sized,
{
    async fn run(&self, ctx: Arc<C>) {
        (**self).run(ctx).await;
    }
}

/// Boxed async function usable as a job callback without a named type.
pub type JobFn<C> =
    Box<dyn Fn(Arc<C>) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

#[async_trait]
impl<C: Send + Sync + 'static> Runnable<C> for JobFn<C> {
    async fn run(&self, ctx: Arc<C>) {
        (self)(ctx).await;
    }
}

/// Wrap an async closure into a [`JobFn`].
pub fn job_fn<C, F, Fut>(f: F) -> JobFn<C>
where
    F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Box::new(move |ctx| Box::pin(f(ctx)))
}

// ── Job state ────────────────────────────────────────────────────────

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Storage exists but the job was never initialized. Scheduling is
    /// rejected in this state.
    Uninitialized,
    /// Initialized and not currently in flight.
    Idle,
    /// A dispatch is in flight: pushed to the queue or armed on a timer.
    Scheduled,
}

// ── Job record ───────────────────────────────────────────────────────

struct JobBinding<C> {
    callback: Arc<dyn Runnable<C>>,
    context: Arc<C>,
}

impl<C> Clone for JobBinding<C> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
            context: Arc::clone(&self.context),
        }
    }
}

struct JobInner<C> {
    state: JobState,
    binding: Option<JobBinding<C>>,
    /// Lazily created on first deferred schedule; replaced on re-arm.
    timer: Option<OneShotTimer>,
}

/// The unit of schedulable work: callback, opaque context, lifecycle
/// state, and an optional deferred-execution timer handle.
///
/// Jobs are created uninitialized; [`TaskPool::initialize_job`] binds the
/// callback and context. A job may be scheduled any number of times over
/// its lifetime, but overlapping in-flight schedules of the same job are
/// the caller's responsibility to avoid.
///
/// [`TaskPool::initialize_job`]: crate::pool::TaskPool::initialize_job
pub struct Job<C> {
    inner: Mutex<JobInner<C>>,
}

impl<C: Send + Sync + 'static> Job<C> {
    /// Allocate an uninitialized job.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(JobInner {
                state: JobState::Uninitialized,
                binding: None,
                timer: None,
            }),
        }
    }

    /// Whether the job has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.lock().state != JobState::Uninitialized
    }

    /// Current lifecycle state.
    pub fn state(&self) -> JobState {
        self.lock().state
    }

    /// Whether the job's deferred timer is armed and has not fired yet.
    pub fn is_timer_armed(&self) -> bool {
        self.lock().timer.as_ref().is_some_and(OneShotTimer::is_armed)
    }

    /// Bind callback and context, overwriting any prior binding and
    /// resetting the state to [`JobState::Idle`].
    pub(crate) fn bind(&self, callback: Arc<dyn Runnable<C>>, context: Arc<C>) {
        let mut inner = self.lock();
        inner.binding = Some(JobBinding { callback, context });
        inner.state = JobState::Idle;
    }

    /// Mark a dispatch in flight.
    pub(crate) fn mark_scheduled(&self) {
        self.lock().state = JobState::Scheduled;
    }

    /// Return to idle after a dispatch was abandoned.
    pub(crate) fn reset_idle(&self) {
        self.lock().state = JobState::Idle;
    }

    /// Worker-side claim: flip `Scheduled` back to `Idle` and hand out the
    /// binding to invoke. `None` if the job carries no binding.
    pub(crate) fn begin_invocation(&self) -> Option<(Arc<dyn Runnable<C>>, Arc<C>)> {
        let mut inner = self.lock();
        if inner.state == JobState::Scheduled {
            inner.state = JobState::Idle;
        }
        inner
            .binding
            .as_ref()
            .map(|b| (Arc::clone(&b.callback), Arc::clone(&b.context)))
    }

    /// Store the timer handle for the latest deferred schedule, replacing
    /// any previous one.
    pub(crate) fn install_timer(&self, timer: OneShotTimer) {
        self.lock().timer = Some(timer);
    }

    fn lock(&self) -> MutexGuard<'_, JobInner<C>> {
        // The lock is only held for field reads/writes, never across an
        // await or a callback, so poisoning cannot occur in practice.
        self.inner.lock().expect("job state lock poisoned")
    }
}

impl<C: Send + Sync + 'static> Default for Job<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for Job<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().expect("job state lock poisoned");
        f.debug_struct("Job")
            .field("state", &inner.state)
            .field("has_timer", &inner.timer.is_some())
            .finish()
    }
}

// ── Tests ────────────────────────────────────────────────────────────
