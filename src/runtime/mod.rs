//! # Runtime orchestration: the invocation loop and the termination
//! coordinator.
//!
//! [`Runner`] drives initialize/run against a control endpoint;
//! [`Terminator`] runs registered cleanup hooks on shutdown, independently
//! of the loop, and is safe to call concurrently with an in-flight
//! invocation.

mod runner;
mod terminator;

pub use runner::{Runner, RunnerState};
pub use terminator::Terminator;
