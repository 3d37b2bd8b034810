// Copyright 2022 Jeff Kim <hiking90@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Monitored Worker Demo
//!
//! Spawns a few instrumented workers, feeds them bursts of jobs over several
//! seconds, and polls the `monitor:type=Performance` bean the way an operator
//! dashboard would.
//!
//! Run with: `RUST_LOG=info cargo run --example monitored_worker`
//! With tracing: `cargo run --example monitored_worker --features tracing`

use actor_monitor::{ManagementRegistry, Monitor, MonitorConfig, Receiver, DEFAULT_OBJECT_NAME};
use std::sync::Arc;
use std::time::Duration;

struct Worker {
    id: usize,
    done: u64,
}

struct Job(u64);

impl Receiver for Worker {
    type Message = Job;

    async fn receive(&mut self, job: Job) {
        tokio::time::sleep(Duration::from_millis(job.0)).await;
        self.done += 1;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();
    #[cfg(not(feature = "tracing"))]
    env_logger::init();

    println!("=== actor-monitor Demo ===\n");

    let registry = Arc::new(ManagementRegistry::new());
    let Some(monitor) = Monitor::start_or_unmonitored(MonitorConfig::default(), &registry) else {
        println!("Monitoring unavailable, exiting.");
        return Ok(());
    };

    let mut mailboxes = Vec::new();
    let mut handles = Vec::new();
    for id in 0..3 {
        let (mailbox, handle) = monitor.spawn(Worker { id, done: 0 });
        mailboxes.push(mailbox);
        handles.push(handle);
    }

    // A dashboard polling the bean once per second.
    let poller = {
        let registry = registry.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            for _ in 0..4 {
                interval.tick().await;
                match registry.get_attribute(DEFAULT_OBJECT_NAME, "MessagesPerSecond") {
                    Ok(rate) => println!("  MessagesPerSecond = {rate}"),
                    Err(e) => println!("  query failed: {e}"),
                }
            }
        })
    };

    for burst in 1..=3u64 {
        println!("Burst {burst}: {} jobs per worker", burst * 10);
        for mailbox in &mailboxes {
            for _ in 0..burst * 10 {
                mailbox.tell(Job(1)).await?;
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    for mailbox in &mailboxes {
        mailbox.stop().await?;
    }
    for handle in handles {
        let worker = handle.join().await?.into_inner();
        println!("Worker {} handled {} jobs", worker.id, worker.done);
    }
    poller.await?;

    let snapshot = monitor.snapshot();
    println!("\nFinal snapshot:");
    println!("  Total messages: {}", snapshot.total_events);
    println!("  Active seconds: {}", snapshot.bucket_count);
    println!("  Mean per second: {}", snapshot.average);
    println!("  Precise mean: {:.2}", monitor.counter().average_precise());

    monitor.shutdown(&registry)?;
    Ok(())
}
