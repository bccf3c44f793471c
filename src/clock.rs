//! Protocol time source.
use std::sync::atomic::{AtomicU64, Ordering};

/// The only clock the protocol consults. Implementations must be
/// monotonically non-decreasing; all freshness and timeout comparisons use
/// this value.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Logical clock driven by the outer scheduler: one unit per tick.
///
/// Shared by every node in an in-process simulation so their timeout
/// windows line up.
#[derive(Debug, Default)]
pub struct TickClock {
    ticks: AtomicU64,
}

impl TickClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance time by one tick. Called by the scheduler, never by nodes.
    pub fn advance(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }
}

impl Clock for TickClock {
    fn now(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}
