//! # Runtime events and the broadcast bus.
//!
//! The runner publishes lifecycle [`Event`]s to a [`Bus`]; subscribers
//! (see [`crate::subscribers`]) receive them for logging or metrics.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
