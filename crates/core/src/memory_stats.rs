//! Managed payload statistics
//!
//! Counts payloads created through [`make_managed`](crate::managed::make_managed)
//! and the moment each one is finally released by the backend. This is the
//! instrumentation hook used to check that shared payloads are freed exactly
//! once (no double free, no leak).
//!
//! # Design
//!
//! Counters are kept twice:
//!
//! ```text
//! ┌──────────────────────────────┐     ┌──────────────────────────────┐
//! │ thread-local counters        │     │ process-wide counters        │
//! │ allocated: Cell<u64>         │ ──▶ │ allocated: AtomicU64         │
//! │ released:  Cell<u64>         │     │ released:  AtomicU64         │
//! └──────────────────────────────┘     └──────────────────────────────┘
//! ```
//!
//! The thread-local pair is exact for work that stays on one thread (every
//! test runs on its own thread, so its numbers are not disturbed by other
//! tests). The process-wide pair is a relaxed aggregate for diagnostics.
//!
//! # Performance
//!
//! - **Updates**: one `Cell` store and one relaxed atomic add
//! - **Disabled**: with the `memory-stats` feature off every update compiles
//!   to nothing and all counters read zero

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of allocation/release counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagedStats {
    /// Payloads created through the managed factory
    pub allocated: u64,
    /// Payloads whose last owner went away
    pub released: u64,
}

impl ManagedStats {
    /// Payloads still alive (allocated but not yet released)
    pub fn live(&self) -> u64 {
        self.allocated.saturating_sub(self.released)
    }

    /// Difference between two snapshots (`self` taken after `earlier`)
    pub fn since(&self, earlier: &ManagedStats) -> ManagedStats {
        ManagedStats {
            allocated: self.allocated - earlier.allocated,
            released: self.released - earlier.released,
        }
    }
}

static TOTAL_ALLOCATED: AtomicU64 = AtomicU64::new(0);
static TOTAL_RELEASED: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static THREAD_ALLOCATED: Cell<u64> = const { Cell::new(0) };
    static THREAD_RELEASED: Cell<u64> = const { Cell::new(0) };
}

/// Record the creation of one managed payload
#[inline]
pub fn record_allocation() {
    #[cfg(feature = "memory-stats")]
    {
        THREAD_ALLOCATED.with(|c| c.set(c.get() + 1));
        TOTAL_ALLOCATED.fetch_add(1, Ordering::Relaxed);
    }
}

/// Record the final release of one managed payload
#[inline]
pub fn record_release() {
    #[cfg(feature = "memory-stats")]
    {
        // try_with: payloads can be dropped during thread-local teardown
        let _ = THREAD_RELEASED.try_with(|c| c.set(c.get() + 1));
        TOTAL_RELEASED.fetch_add(1, Ordering::Relaxed);
    }
}

/// Counts for the calling thread
pub fn thread_stats() -> ManagedStats {
    ManagedStats {
        allocated: THREAD_ALLOCATED.with(Cell::get),
        released: THREAD_RELEASED.with(Cell::get),
    }
}

/// Counts aggregated over every thread of the process
pub fn global_stats() -> ManagedStats {
    ManagedStats {
        allocated: TOTAL_ALLOCATED.load(Ordering::Relaxed),
        released: TOTAL_RELEASED.load(Ordering::Relaxed),
    }
}

#[cfg(all(test, feature = "memory-stats"))]
mod tests {
    use super::*;

    #[test]
    fn test_thread_counters() {
        let before = thread_stats();

        record_allocation();
        record_allocation();
        record_release();

        let delta = thread_stats().since(&before);
        assert_eq!(delta.allocated, 2);
        assert_eq!(delta.released, 1);
        assert_eq!(delta.live(), 1);
    }

    #[test]
    fn test_global_counters_include_thread_counts() {
        let before = global_stats();
        record_allocation();
        record_release();
        let after = global_stats();

        // Other tests may run concurrently, so only lower bounds hold
        assert!(after.allocated > before.allocated);
        assert!(after.released > before.released);
    }

    #[test]
    fn test_threads_do_not_share_counters() {
        use std::thread;

        let before = thread_stats();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                thread::spawn(|| {
                    record_allocation();
                    thread_stats().allocated
                })
            })
            .collect();

        for h in handles {
            // Fresh threads only see their own allocation
            assert_eq!(h.join().unwrap(), 1);
        }

        assert_eq!(thread_stats().since(&before).allocated, 0);
    }

    #[test]
    fn test_live_never_underflows() {
        let stats = ManagedStats {
            allocated: 1,
            released: 3,
        };
        assert_eq!(stats.live(), 0);
    }
}
