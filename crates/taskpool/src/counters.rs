//! Diagnostic counters for the task pool.
//!
//! Counters increase monotonically for the pool's lifetime and are never
//! reset; readers take a [`CountersSnapshot`] for telemetry or assertions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Monotonic dispatch counters shared by the scheduler entry points, the
/// deferred timer bridge, and the workers.
#[derive(Debug, Default)]
pub struct Counters {
    initialized: AtomicU64,
    direct_dispatch: AtomicU64,
    direct_dispatch_failed: AtomicU64,
    schedule_illegal: AtomicU64,
    deferred_armed: AtomicU64,
    deferred_dispatch: AtomicU64,
    deferred_dispatch_failed: AtomicU64,
}

impl Counters {
    pub(crate) fn record_initialized(&self) {
        self.initialized.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_direct_dispatch(&self) {
        self.direct_dispatch.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_direct_dispatch_failed(&self) {
        self.direct_dispatch_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_schedule_illegal(&self) {
        self.schedule_illegal.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_deferred_armed(&self) {
        self.deferred_armed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_deferred_dispatch(&self) {
        self.deferred_dispatch.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_deferred_dispatch_failed(&self) {
        self.deferred_dispatch_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of every counter.
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            initialized: self.initialized.load(Ordering::Relaxed),
            direct_dispatch: self.direct_dispatch.load(Ordering::Relaxed),
            direct_dispatch_failed: self.direct_dispatch_failed.load(Ordering::Relaxed),
            schedule_illegal: self.schedule_illegal.load(Ordering::Relaxed),
            deferred_armed: self.deferred_armed.load(Ordering::Relaxed),
            deferred_dispatch: self.deferred_dispatch.load(Ordering::Relaxed),
            deferred_dispatch_failed: self.deferred_dispatch_failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the pool's counters, serializable for telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountersSnapshot {
    /// Jobs initialized (including re-initializations).
    pub initialized: u64,
    /// Immediate schedules accepted by the dispatch queue.
    pub direct_dispatch: u64,
    /// Immediate schedules rejected by a full or closed queue.
    pub direct_dispatch_failed: u64,
    /// Schedule calls rejected on a precondition.
    pub schedule_illegal: u64,
    /// Deferred schedules whose timer was armed.
    pub deferred_armed: u64,
    /// Timer firings whose queue push succeeded.
    pub deferred_dispatch: u64,
    /// Timer firings whose queue push was dropped.
    pub deferred_dispatch_failed: u64,
}

// ── Tests ────────────────────────────────────────────────────────────
