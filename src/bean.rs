// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use crate::metrics::EventRateCounter;
use crate::registry::ManagedBean;

/// Management bean exposing the messages-per-second rate of a counter.
///
/// Registered by [`Monitor`](crate::Monitor) under
/// [`DEFAULT_OBJECT_NAME`](crate::DEFAULT_OBJECT_NAME) unless configured
/// otherwise.
#[derive(Debug, Clone)]
pub struct PerformanceBean {
    counter: Arc<EventRateCounter>,
}

impl PerformanceBean {
    /// Name of the attribute that reports [`messages_per_second`](Self::messages_per_second).
    pub const MESSAGES_PER_SECOND: &'static str = "MessagesPerSecond";

    pub fn new(counter: Arc<EventRateCounter>) -> Self {
        Self { counter }
    }

    /// Returns the counter's truncated mean as a float.
    #[inline]
    pub fn messages_per_second(&self) -> f64 {
        self.counter.average() as f64
    }
}

impl ManagedBean for PerformanceBean {
    fn attribute_names(&self) -> &'static [&'static str] {
        &[Self::MESSAGES_PER_SECOND]
    }

    fn attribute(&self, name: &str) -> Option<f64> {
        match name {
            Self::MESSAGES_PER_SECOND => Some(self.messages_per_second()),
            _ => None,
        }
    }
}
