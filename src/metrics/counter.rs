// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::RateSnapshot;
use crate::clock::{Clock, SystemClock};

/// Counts events per wall-clock second and reports the mean events-per-second.
///
/// Each call to [`record`](Self::record) increments the bucket for the current
/// epoch second. [`average`](Self::average) returns the sum of all buckets
/// divided by the number of buckets.
///
/// # Thread Safety
///
/// The bucket map is guarded by a single mutex:
/// - `record` performs its read-modify-write under the lock, so concurrent
///   increments within the same second are never lost
/// - `average` and `snapshot` sum all buckets under one acquisition
///
/// Neither operation awaits or performs I/O while holding the lock.
///
/// # Retention
///
/// Buckets are never expired. A process that records events for `n` distinct
/// seconds holds `n` entries, so memory grows with the number of active
/// seconds over the process lifetime.
#[derive(Debug)]
pub struct EventRateCounter {
    buckets: Mutex<HashMap<u64, u64>>,
    clock: Arc<dyn Clock>,
}

impl EventRateCounter {
    /// Creates an empty counter reading the system wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty counter reading `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Records one event in the bucket for the current second.
    #[inline]
    pub fn record(&self) {
        self.record_at(self.clock.now_secs());
    }

    /// Records one event in the bucket for `second`.
    pub fn record_at(&self, second: u64) {
        let mut buckets = self.buckets.lock();
        let count = buckets.entry(second).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Returns the mean number of events per observed second.
    ///
    /// Uses integer division, so the result is truncated toward zero.
    /// Returns `0` if nothing has been recorded.
    pub fn average(&self) -> u64 {
        let buckets = self.buckets.lock();
        if buckets.is_empty() {
            return 0;
        }
        sum(&buckets) / buckets.len() as u64
    }

    /// Returns the mean number of events per observed second without truncation.
    ///
    /// Returns `0.0` if nothing has been recorded.
    pub fn average_precise(&self) -> f64 {
        let buckets = self.buckets.lock();
        if buckets.is_empty() {
            return 0.0;
        }
        sum(&buckets) as f64 / buckets.len() as f64
    }

    /// Returns the number of distinct seconds in which an event was recorded.
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.lock().len()
    }

    /// Returns the total number of events recorded.
    pub fn total(&self) -> u64 {
        sum(&self.buckets.lock())
    }

    /// Returns the number of events recorded during `second`.
    pub fn count_at(&self, second: u64) -> u64 {
        self.buckets.lock().get(&second).copied().unwrap_or(0)
    }

    /// Creates an immutable snapshot of the counter.
    ///
    /// All fields are computed under a single lock acquisition, so they
    /// describe the same point in time.
    pub fn snapshot(&self) -> RateSnapshot {
        let buckets = self.buckets.lock();
        let total_events = sum(&buckets);
        let bucket_count = buckets.len();

        RateSnapshot {
            bucket_count,
            total_events,
            average: if bucket_count > 0 {
                total_events / bucket_count as u64
            } else {
                0
            },
            first_second: buckets.keys().min().copied(),
            last_second: buckets.keys().max().copied(),
        }
    }
}

impl Default for EventRateCounter {
    fn default() -> Self {
        Self::new()
    }
}

fn sum(buckets: &HashMap<u64, u64>) -> u64 {
    buckets
        .values()
        .fold(0u64, |acc, count| acc.saturating_add(*count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn manual(secs: u64) -> (Arc<ManualClock>, EventRateCounter) {
        let clock = Arc::new(ManualClock::new(secs));
        let counter = EventRateCounter::with_clock(clock.clone());
        (clock, counter)
    }

    #[test]
    fn test_initial_state() {
        let counter = EventRateCounter::new();

        assert_eq!(counter.average(), 0);
        assert_eq!(counter.average_precise(), 0.0);
        assert_eq!(counter.bucket_count(), 0);
        assert_eq!(counter.total(), 0);
    }

    #[test]
    fn test_same_second() {
        let (_clock, counter) = manual(1_000);

        for _ in 0..5 {
            counter.record();
        }

        assert_eq!(counter.bucket_count(), 1);
        assert_eq!(counter.count_at(1_000), 5);
        assert_eq!(counter.average(), 5);
    }

    #[test]
    fn test_two_seconds_truncates() {
        let (clock, counter) = manual(100);

        counter.record();
        counter.record();
        clock.advance(1);
        counter.record();

        // (2 + 1) / 2
        assert_eq!(counter.average(), 1);
        assert_eq!(counter.average_precise(), 1.5);
    }

    #[test]
    fn test_simulated_timeline() {
        let (clock, counter) = manual(100);

        counter.record();
        counter.record();
        counter.record();
        clock.set(101);
        counter.record();

        assert_eq!(counter.average(), 2);
    }

    #[test]
    fn test_backward_clock_reuses_bucket() {
        let (clock, counter) = manual(200);

        counter.record();
        clock.set(201);
        counter.record();
        clock.set(200);
        counter.record();

        assert_eq!(counter.bucket_count(), 2);
        assert_eq!(counter.count_at(200), 2);
        assert_eq!(counter.count_at(201), 1);
    }

    #[test]
    fn test_average_is_idempotent() {
        let (clock, counter) = manual(10);
        counter.record();
        clock.advance(1);
        counter.record_at(11);
        counter.record_at(11);

        let first = counter.average();
        assert_eq!(counter.average(), first);
        assert_eq!(counter.average(), first);
        assert_eq!(counter.total(), 3);
    }

    #[test]
    fn test_snapshot() {
        let (_clock, counter) = manual(0);
        counter.record_at(7);
        counter.record_at(3);
        counter.record_at(3);
        counter.record_at(5);

        let snapshot = counter.snapshot();
        assert_eq!(snapshot.bucket_count, 3);
        assert_eq!(snapshot.total_events, 4);
        assert_eq!(snapshot.average, 1);
        assert_eq!(snapshot.first_second, Some(3));
        assert_eq!(snapshot.last_second, Some(7));
    }

    #[test]
    fn test_concurrent_record_same_second() {
        let (_clock, counter) = manual(500);
        let counter = Arc::new(counter);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        counter.record();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.count_at(500), 8_000);
        assert_eq!(counter.average(), 8_000);
    }
}
