// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Second-resolution clock sources for [`EventRateCounter`](crate::EventRateCounter).

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

/// A wall-clock source with second resolution.
///
/// The counter asks the clock for "now" once per recorded event and uses the
/// returned value as the bucket key. Implementations must be cheap and must
/// not block.
pub trait Clock: Send + Sync + Debug + 'static {
    /// Returns the current time as whole seconds since `UNIX_EPOCH`.
    fn now_secs(&self) -> u64;
}

/// The system wall clock.
///
/// A clock that reports a time before `UNIX_EPOCH` reads as second `0`.
/// Backward adjustments of the system clock are passed through unchanged,
/// so events may land in an earlier bucket.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
    }
}

/// A manually driven clock for tests and replay.
///
/// ```rust
/// use actor_monitor::{EventRateCounter, ManualClock};
/// use std::sync::Arc;
///
/// let clock = Arc::new(ManualClock::new(100));
/// let counter = EventRateCounter::with_clock(clock.clone());
/// counter.record();
/// clock.advance(1);
/// counter.record();
/// assert_eq!(counter.bucket_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    secs: AtomicU64,
}

impl ManualClock {
    /// Creates a clock frozen at `secs`.
    pub fn new(secs: u64) -> Self {
        Self {
            secs: AtomicU64::new(secs),
        }
    }

    /// Moves the clock to `secs`. Moving backwards is allowed.
    pub fn set(&self, secs: u64) {
        self.secs.store(secs, Ordering::Relaxed);
    }

    /// Moves the clock forward by `secs`, saturating at `u64::MAX`.
    pub fn advance(&self, secs: u64) {
        let _ = self
            .secs
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.saturating_add(secs))
            });
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_secs(&self) -> u64 {
        self.secs.load(Ordering::Relaxed)
    }
}
