//! Ledger clock.
//!
//! The cooldown clock is authoritative state of the ledger, never
//! client-supplied wall time: a caller that could pass its own `now` could
//! trivially skip the withdrawal cooldown. The ledger is constructed with a
//! `Clock` and reads it inside the per-owner critical section.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of unix-seconds timestamps for the ledger.
pub trait Clock: Send + Sync {
    fn unix_now(&self) -> u64;
}

/// Host wall clock.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_now(&self) -> u64 {
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Manually advanced clock for tests and simulators.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn unix_now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
