// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use log::{info, warn};

use crate::bean::PerformanceBean;
use crate::dispatch::{self, Mailbox, Monitored, Receiver, ReceiverHandle};
use crate::error::{RegistrationError, Result};
use crate::metrics::{EventRateCounter, RateSnapshot};
use crate::registry::{ManagementRegistry, ObjectName};

/// Name the performance bean is registered under by default.
pub const DEFAULT_OBJECT_NAME: &str = "monitor:type=Performance";

/// Default mailbox capacity for receivers spawned through [`Monitor::spawn`].
pub const DEFAULT_MAILBOX_CAPACITY: usize = 32;

/// Settings for [`Monitor::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Management name for the performance bean.
    pub object_name: String,
    /// Mailbox capacity used by [`Monitor::spawn`].
    pub mailbox_capacity: usize,
}

impl MonitorConfig {
    pub fn with_object_name(mut self, name: impl Into<String>) -> Self {
        self.object_name = name.into();
        self
    }

    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity;
        self
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            object_name: DEFAULT_OBJECT_NAME.to_string(),
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
        }
    }
}

/// Owns the shared message counter and its management registration.
///
/// Build one `Monitor` in the application's startup code and keep it for the
/// lifetime of the process. Receivers are instrumented with
/// [`instrument`](Self::instrument) or [`spawn`](Self::spawn); operators read
/// the rate through the registry under [`object_name`](Self::object_name).
///
/// ```rust
/// use actor_monitor::{ManagementRegistry, Monitor, MonitorConfig};
///
/// let registry = ManagementRegistry::new();
/// let monitor = Monitor::start(MonitorConfig::default(), &registry).unwrap();
///
/// monitor.record_event();
/// let rate = registry
///     .get_attribute("monitor:type=Performance", "MessagesPerSecond")
///     .unwrap();
/// assert_eq!(rate, 1.0);
/// ```
#[derive(Debug)]
pub struct Monitor {
    counter: Arc<EventRateCounter>,
    object_name: ObjectName,
    config: MonitorConfig,
}

impl Monitor {
    /// Creates a counter reading the system clock and registers its bean.
    pub fn start(
        config: MonitorConfig,
        registry: &ManagementRegistry,
    ) -> std::result::Result<Self, RegistrationError> {
        Self::start_with_counter(config, registry, Arc::new(EventRateCounter::new()))
    }

    /// Registers a bean for an existing `counter`.
    pub fn start_with_counter(
        config: MonitorConfig,
        registry: &ManagementRegistry,
        counter: Arc<EventRateCounter>,
    ) -> std::result::Result<Self, RegistrationError> {
        let bean = PerformanceBean::new(counter.clone());
        let object_name = registry.register(&config.object_name, Arc::new(bean))?;
        info!("Message monitoring started as {}.", object_name);

        Ok(Self {
            counter,
            object_name,
            config,
        })
    }

    /// Like [`start`](Self::start), but logs a registration failure and
    /// returns `None` so the host can continue unmonitored.
    pub fn start_or_unmonitored(
        config: MonitorConfig,
        registry: &ManagementRegistry,
    ) -> Option<Self> {
        match Self::start(config, registry) {
            Ok(monitor) => Some(monitor),
            Err(e) => {
                warn!("Message monitoring disabled: {}", e);
                None
            }
        }
    }

    /// Records one received message.
    #[inline]
    pub fn record_event(&self) {
        self.counter.record();
    }

    /// Returns the current mean messages per second.
    pub fn current_rate(&self) -> f64 {
        self.counter.average() as f64
    }

    pub fn snapshot(&self) -> RateSnapshot {
        self.counter.snapshot()
    }

    pub fn counter(&self) -> &Arc<EventRateCounter> {
        &self.counter
    }

    pub fn object_name(&self) -> &ObjectName {
        &self.object_name
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Wraps `receiver` so each message it receives is counted.
    pub fn instrument<R: Receiver>(&self, receiver: R) -> Monitored<R> {
        Monitored::new(receiver, self.counter.clone())
    }

    /// Spawns an instrumented `receiver` with the configured mailbox capacity.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn<R: Receiver>(
        &self,
        receiver: R,
    ) -> (Mailbox<R::Message>, ReceiverHandle<Monitored<R>>) {
        dispatch::spawn(self.instrument(receiver), self.config.mailbox_capacity)
    }

    /// Removes the bean from `registry`. The counter stays readable.
    pub fn shutdown(&self, registry: &ManagementRegistry) -> Result<()> {
        registry.unregister(&self.object_name)?;
        info!("Message monitoring stopped for {}.", self.object_name);
        Ok(())
    }
}
