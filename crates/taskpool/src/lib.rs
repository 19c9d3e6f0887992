//! A fixed-size task pool executing short callback jobs either immediately
//! or after a deferred interval, backed by a bounded dispatch queue and a
//! one-shot timer bridge.
//!
//! Callers allocate a [`Job`], initialize it against a [`TaskPool`], and
//! schedule it any number of times; each accepted schedule runs the job's
//! callback exactly once on some worker. Misuse (scheduling an
//! uninitialized job, scheduling before the pool is started) is rejected
//! with a [`TaskPoolError`], never undefined behavior.

pub mod config;
pub mod counters;
pub mod error;
pub mod job;
pub mod pool;
pub mod queue;
pub mod timer;

mod worker;

pub use config::PoolConfig;
pub use counters::{Counters, CountersSnapshot};
pub use error::{
    strerror, TaskPoolError, STATUS_FAILED_OPERATION, STATUS_GENERAL_FAILURE,
    STATUS_ILLEGAL_OPERATION, STATUS_SUCCESS,
};
pub use job::{job_fn, Job, JobFn, JobState, Runnable};
pub use pool::TaskPool;
pub use queue::{DispatchQueue, DispatchReceiver};
pub use timer::OneShotTimer;
