// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Messages-per-second metrics.
//!
//! [`EventRateCounter`] buckets events by wall-clock second and reports the
//! mean events per observed second. [`RateSnapshot`] is a consistent,
//! immutable view of the counter for reporting.
//!
//! # Example
//!
//! ```rust
//! use actor_monitor::{EventRateCounter, ManualClock};
//! use std::sync::Arc;
//!
//! let clock = Arc::new(ManualClock::new(100));
//! let counter = EventRateCounter::with_clock(clock.clone());
//!
//! counter.record();
//! counter.record();
//! counter.record();
//! clock.set(101);
//! counter.record();
//!
//! // (3 + 1) / 2
//! assert_eq!(counter.average(), 2);
//! ```

mod counter;
mod snapshot;

pub use counter::EventRateCounter;
pub use snapshot::RateSnapshot;
