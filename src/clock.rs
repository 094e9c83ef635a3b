//! monotonic millisecond clocks
//!
//! the engine never sleeps or spawns timers; it compares deadlines against a
//! [`Clock`] whenever it is ticked. tests drive a [`ManualClock`] by hand.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

/// source of monotonic time in milliseconds
pub trait Clock: Send + Sync {
    /// milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u64;
}

/// wall clock backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// starts counting from now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// clock that only moves when told to
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// a clock sitting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// moves time forward
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    /// jumps to an absolute time
    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// shared handle used by the engine and viewer
pub type SharedClock = Arc<dyn Clock>;
