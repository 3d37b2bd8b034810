// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! # actor-monitor: messages-per-second monitoring for actors
//!
//! `actor-monitor` counts the messages a component receives, bucketed by
//! wall-clock second, and exposes the mean messages per second through a
//! named management endpoint.
//!
//! ## Core Concepts
//!
//! - **[`EventRateCounter`]**: Buckets events by epoch second. `record()` adds
//!   one event to the current second; `average()` returns the truncated mean
//!   over every second that saw an event. Buckets are never expired.
//! - **[`Receiver`]** and **[`Monitored`]**: The receive entry point of a
//!   message-handling component, and a decorator that records one event per
//!   message before delegating.
//! - **[`spawn`]**: Runs a receiver in a tokio task behind a bounded
//!   [`Mailbox`].
//! - **[`ManagementRegistry`]**: Named [`ManagedBean`]s that operators query
//!   by [`ObjectName`], e.g. `monitor:type=Performance`.
//! - **[`Monitor`]**: Ties it together. Owns the counter, registers a
//!   [`PerformanceBean`], and instruments receivers.
//!
//! ## Getting Started
//!
//! ```rust
//! use actor_monitor::{ManagementRegistry, Monitor, MonitorConfig, Receiver};
//! use std::sync::Arc;
//!
//! struct Greeter;
//!
//! impl Receiver for Greeter {
//!     type Message = String;
//!
//!     async fn receive(&mut self, name: String) {
//!         println!("Hello, {name}!");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = Arc::new(ManagementRegistry::new());
//!     let monitor = Monitor::start(MonitorConfig::default(), &registry)?;
//!
//!     let (mailbox, handle) = monitor.spawn(Greeter);
//!     mailbox.tell("Ada".to_string()).await?;
//!     mailbox.tell("Grace".to_string()).await?;
//!     mailbox.stop().await?;
//!     handle.join().await?;
//!
//!     let rate = registry.get_attribute("monitor:type=Performance", "MessagesPerSecond")?;
//!     println!("{rate} messages/s");
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! The crate logs through the `log` facade. With the `tracing` feature, each
//! receive loop also runs inside a `tracing` span named `receive_loop`.

mod bean;
pub mod clock;
mod dispatch;
mod error;
mod metrics;
mod monitor;
mod registry;

pub use bean::PerformanceBean;
pub use clock::{Clock, ManualClock, SystemClock};
pub use dispatch::{spawn, Mailbox, Monitored, Receiver, ReceiverHandle};
pub use error::{Error, RegistrationError, Result};
pub use metrics::{EventRateCounter, RateSnapshot};
pub use monitor::{Monitor, MonitorConfig, DEFAULT_MAILBOX_CAPACITY, DEFAULT_OBJECT_NAME};
pub use registry::{ManagedBean, ManagementRegistry, ObjectName};
