// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Message dispatch and the receive-side interception point.
//!
//! A [`Receiver`] is the entry point a host calls once per incoming message.
//! [`Monitored`] decorates any receiver so every message is counted by an
//! [`EventRateCounter`] before the inner receiver sees it. [`spawn`] runs a
//! receiver in its own tokio task fed by a bounded mailbox.
//!
//! ```rust
//! use actor_monitor::{spawn, EventRateCounter, Monitored, Receiver};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl Receiver for Printer {
//!     type Message = String;
//!
//!     async fn receive(&mut self, msg: String) {
//!         println!("{msg}");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> actor_monitor::Result<()> {
//!     let counter = Arc::new(EventRateCounter::new());
//!     let (mailbox, handle) = spawn(Monitored::new(Printer, counter.clone()), 16);
//!
//!     mailbox.tell("hello".to_string()).await?;
//!     mailbox.stop().await?;
//!     handle.join().await?;
//!
//!     assert_eq!(counter.total(), 1);
//!     Ok(())
//! }
//! ```

use std::any::type_name;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use log::{debug, info, trace};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::metrics::EventRateCounter;

/// The receive entry point of a message-handling component.
///
/// Messages are delivered one at a time, in mailbox order; `receive` is not
/// called again until the previous future completes.
pub trait Receiver: Send + 'static {
    /// The message type this receiver accepts.
    type Message: Send + 'static;

    /// Handles one incoming message.
    fn receive(&mut self, msg: Self::Message) -> impl Future<Output = ()> + Send;
}

/// A [`Receiver`] decorator that records one event per received message.
///
/// The event is recorded before the inner receiver runs, so a message counts
/// even if its handler is slow.
pub struct Monitored<R> {
    inner: R,
    counter: Arc<EventRateCounter>,
}

impl<R> Monitored<R> {
    pub fn new(inner: R, counter: Arc<EventRateCounter>) -> Self {
        Self { inner, counter }
    }

    /// Returns the counter events are recorded in.
    pub fn counter(&self) -> &Arc<EventRateCounter> {
        &self.counter
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Unwraps the decorated receiver.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Receiver> Receiver for Monitored<R> {
    type Message = R::Message;

    async fn receive(&mut self, msg: Self::Message) {
        self.counter.record();
        self.inner.receive(msg).await;
    }
}

impl<R: fmt::Debug> fmt::Debug for Monitored<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitored")
            .field("inner", &self.inner)
            .field("events", &self.counter.total())
            .finish()
    }
}

enum MailboxMessage<M> {
    Envelope(M),
    Stop,
}

/// The sending side of a spawned receiver's mailbox.
///
/// Cloning a `Mailbox` creates another sender to the same receiver. The
/// receive loop ends after a [`stop`](Mailbox::stop) request is processed, or
/// once every `Mailbox` has been dropped.
pub struct Mailbox<M> {
    sender: mpsc::Sender<MailboxMessage<M>>,
    receiver: &'static str,
}

impl<M: Send + 'static> Mailbox<M> {
    /// Sends a message, waiting for mailbox capacity if it is full.
    pub async fn tell(&self, msg: M) -> Result<()> {
        self.sender
            .send(MailboxMessage::Envelope(msg))
            .await
            .map_err(|_| self.closed_error())
    }

    /// Sends a message without waiting. Fails if the mailbox is full or closed.
    pub fn try_tell(&self, msg: M) -> Result<()> {
        self.sender
            .try_send(MailboxMessage::Envelope(msg))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => Error::Send {
                    receiver: self.receiver,
                    details: "mailbox full".to_string(),
                },
                mpsc::error::TrySendError::Closed(_) => self.closed_error(),
            })
    }

    /// Asks the receiver to stop after the messages already queued.
    pub async fn stop(&self) -> Result<()> {
        debug!("Sending Stop to {}.", self.receiver);
        self.sender
            .send(MailboxMessage::Stop)
            .await
            .map_err(|_| self.closed_error())
    }

    /// Returns `true` once the receive loop has ended.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn closed_error(&self) -> Error {
        Error::Send {
            receiver: self.receiver,
            details: "mailbox closed".to_string(),
        }
    }
}

impl<M> Clone for Mailbox<M> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            receiver: self.receiver,
        }
    }
}

impl<M> fmt::Debug for Mailbox<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailbox")
            .field("receiver", &self.receiver)
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

/// Handle to a spawned receive loop.
#[derive(Debug)]
pub struct ReceiverHandle<R> {
    handle: JoinHandle<R>,
}

impl<R> ReceiverHandle<R> {
    /// Waits for the receive loop to end and returns the receiver.
    pub async fn join(self) -> Result<R> {
        self.handle.await.map_err(|source| Error::Join { source })
    }

    /// Aborts the receive loop without draining the mailbox.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawns `receiver` on the current tokio runtime with a mailbox of `capacity`.
///
/// A `capacity` of zero is raised to one.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn<R: Receiver>(receiver: R, capacity: usize) -> (Mailbox<R::Message>, ReceiverHandle<R>) {
    let (sender, mailbox) = mpsc::channel(capacity.max(1));
    let handle = tokio::spawn(run_receive_loop(receiver, mailbox));

    (
        Mailbox {
            sender,
            receiver: type_name::<R>(),
        },
        ReceiverHandle { handle },
    )
}

#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "receive_loop", skip_all, fields(receiver = type_name::<R>()))
)]
async fn run_receive_loop<R: Receiver>(
    mut receiver: R,
    mut mailbox: mpsc::Receiver<MailboxMessage<R::Message>>,
) -> R {
    let name = type_name::<R>();
    debug!("Receive loop for {} is running.", name);

    while let Some(message) = mailbox.recv().await {
        match message {
            MailboxMessage::Envelope(msg) => {
                trace!("{} received {}.", name, type_name::<R::Message>());
                receiver.receive(msg).await;
            }
            MailboxMessage::Stop => {
                info!("{} received Stop.", name);
                break;
            }
        }
    }

    mailbox.close();
    debug!("Receive loop for {} ended.", name);
    receiver
}
