// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

/// Immutable snapshot of an [`EventRateCounter`](crate::EventRateCounter).
///
/// All fields are read under one lock acquisition and describe the same
/// instant.
///
/// # Example
///
/// ```rust
/// use actor_monitor::EventRateCounter;
///
/// let counter = EventRateCounter::new();
/// counter.record_at(100);
/// counter.record_at(100);
/// counter.record_at(101);
///
/// let snapshot = counter.snapshot();
/// assert_eq!(snapshot.total_events, 3);
/// assert_eq!(snapshot.span_secs(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct RateSnapshot {
    /// Number of distinct seconds with at least one event.
    pub bucket_count: usize,

    /// Total number of events across all buckets.
    pub total_events: u64,

    /// Mean events per observed second, truncated.
    ///
    /// `0` if no events have been recorded.
    pub average: u64,

    /// Earliest second with an event, if any.
    pub first_second: Option<u64>,

    /// Latest second with an event, if any.
    pub last_second: Option<u64>,
}

impl RateSnapshot {
    /// Returns the number of seconds between the first and last bucket, inclusive.
    ///
    /// This can exceed `bucket_count` when some seconds saw no events.
    pub fn span_secs(&self) -> u64 {
        match (self.first_second, self.last_second) {
            (Some(first), Some(last)) => last.saturating_sub(first).saturating_add(1),
            _ => 0,
        }
    }

    /// Returns `true` if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.bucket_count == 0
    }
}

impl Default for RateSnapshot {
    fn default() -> Self {
        Self {
            bucket_count: 0,
            total_events: 0,
            average: 0,
            first_second: None,
            last_second: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_snapshot_default() {
        let snapshot = RateSnapshot::default();

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.total_events, 0);
        assert_eq!(snapshot.average, 0);
        assert_eq!(snapshot.span_secs(), 0);
    }

    #[test]
    fn test_span_counts_idle_seconds() {
        let snapshot = RateSnapshot {
            bucket_count: 2,
            total_events: 4,
            average: 2,
            first_second: Some(100),
            last_second: Some(104),
        };

        assert_eq!(snapshot.span_secs(), 5);
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn test_rate_snapshot_debug() {
        let debug_str = format!("{:?}", RateSnapshot::default());

        assert!(debug_str.contains("RateSnapshot"));
        assert!(debug_str.contains("bucket_count"));
    }
}
