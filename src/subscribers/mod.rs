//! # Event subscribers for the funcvisor runtime.
//!
//! Subscribers observe the [`Event`](crate::events::Event) stream published
//! by the runner:
//!
//! ```text
//!   Runner ── publish(Event) ──► Bus ──► listener task
//!                                            │
//!                                   ┌────────┼─────────┐
//!                                   ▼        ▼         ▼
//!                               LogWriter  Metrics   Custom
//! ```
//!
//! Use [`spawn_listener`] to drive a set of subscribers from a bus.

mod subscriber;

#[cfg(feature = "logging")]
mod log;

pub use subscriber::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::events::Bus;

/// Spawns a listener task that fans bus events out to the given subscribers.
///
/// Subscribers are called in order for each event. A lagging listener skips
/// the oldest events (see [`Bus`] capacity behavior) rather than blocking
/// the publisher. The task ends when the bus is dropped.
pub fn spawn_listener(bus: &Bus, subscribers: Vec<Arc<dyn Subscribe>>) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    for sub in &subscribers {
                        sub.on_event(&event).await;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}
