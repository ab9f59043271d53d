//! # Termination coordinator.
//!
//! [`Terminator`] is a registry of named shutdown hooks. Hooks may be
//! registered concurrently with normal loop operation, right up until
//! shutdown begins; [`Terminator::terminate`] then runs every hook and
//! collects every failure instead of stopping at the first one.
//!
//! ## Ordering
//! Hooks run strictly in **reverse registration order**: resources are torn
//! down opposite to how they were built up. Hooks must not depend on any
//! other hidden ordering.
//!
//! ## Idempotency
//! `terminate()` is idempotent: the first call runs the hooks, every later
//! call returns the same aggregate without re-running anything. A call that
//! arrives while the first is still running waits for it and returns the
//! same outcome.
//!
//! ## Observability
//! A terminator built with [`Terminator::with_bus`] publishes
//! [`EventKind::ShutdownRequested`] when hooks start and a
//! [`EventKind::HookCompleted`]/[`EventKind::HookFailed`] event per hook.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use tokio::sync::Notify;

use crate::error::{BoxError, HookFailure, RegisterError, TerminationError};
use crate::events::{Bus, Event, EventKind};

type HookFuture = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send>>;
type Hook = Box<dyn Fn() -> HookFuture + Send + Sync>;

/// Lifecycle of the hook registry: a one-way latch.
enum Phase {
    /// Hooks may still be registered.
    Accepting(Vec<(String, Hook)>),
    /// `terminate()` is running the hooks.
    Terminating,
    /// Hooks have run; the aggregate outcome is cached.
    Terminated(Option<TerminationError>),
}

/// Registry and coordinator for shutdown hooks.
///
/// # Example
/// ```
/// use funcvisor::Terminator;
///
/// # async fn demo() {
/// let terminator = Terminator::new();
/// terminator
///     .register("connection-pool", || async { Ok(()) })
///     .unwrap();
///
/// // On shutdown:
/// let outcome = terminator.terminate().await;
/// assert!(outcome.is_none()); // clean shutdown
/// # }
/// ```
pub struct Terminator {
    phase: Mutex<Phase>,
    done: Notify,
    bus: Option<Bus>,
}

impl Default for Terminator {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminator {
    /// Creates an empty hook registry.
    pub fn new() -> Self {
        Self {
            phase: Mutex::new(Phase::Accepting(Vec::new())),
            done: Notify::new(),
            bus: None,
        }
    }

    /// Creates an empty hook registry that publishes shutdown events to the
    /// given bus ([`EventKind::ShutdownRequested`], [`EventKind::HookCompleted`],
    /// [`EventKind::HookFailed`]).
    ///
    /// Typically handed the runner's bus (see [`Runner::bus`](crate::Runner::bus))
    /// so shutdown shows up in the same event stream as the loop.
    pub fn with_bus(bus: Bus) -> Self {
        Self {
            phase: Mutex::new(Phase::Accepting(Vec::new())),
            done: Notify::new(),
            bus: Some(bus),
        }
    }

    fn publish(&self, event: Event) {
        if let Some(bus) = &self.bus {
            bus.publish(event);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Registers a named cleanup hook.
    ///
    /// Hooks should be idempotent; they run exactly once, at shutdown.
    /// Fails with [`RegisterError::AlreadyTerminating`] once shutdown has
    /// started.
    pub fn register<F, Fut>(&self, name: impl Into<String>, hook: F) -> Result<(), RegisterError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let name = name.into();
        let mut phase = self.lock();
        match &mut *phase {
            Phase::Accepting(hooks) => {
                hooks.push((name, Box::new(move || Box::pin(hook()))));
                Ok(())
            }
            _ => Err(RegisterError::AlreadyTerminating { name }),
        }
    }

    /// Runs every registered hook and returns the aggregate outcome.
    ///
    /// Each hook's failure is captured independently; one failing hook never
    /// prevents the others from running. Returns `None` if every hook
    /// succeeded, otherwise a [`TerminationError`] listing every failure
    /// with its hook name.
    ///
    /// Safe to call concurrently with an in-flight invocation and with
    /// itself; only the first call runs hooks.
    pub async fn terminate(&self) -> Option<TerminationError> {
        let hooks = {
            let mut phase = self.lock();
            match &mut *phase {
                Phase::Accepting(hooks) => {
                    let taken = std::mem::take(hooks);
                    *phase = Phase::Terminating;
                    Some(taken)
                }
                Phase::Terminating => None,
                Phase::Terminated(result) => return result.clone(),
            }
        };

        match hooks {
            Some(hooks) => {
                self.publish(Event::new(EventKind::ShutdownRequested));
                let mut failures = Vec::new();
                for (name, hook) in hooks.into_iter().rev() {
                    match hook().await {
                        Ok(()) => {
                            self.publish(
                                Event::new(EventKind::HookCompleted).with_hook(name.as_str()),
                            );
                        }
                        Err(e) => {
                            let message = e.to_string();
                            self.publish(
                                Event::new(EventKind::HookFailed)
                                    .with_hook(name.as_str())
                                    .with_reason(message.clone()),
                            );
                            failures.push(HookFailure {
                                hook: name,
                                message,
                            });
                        }
                    }
                }
                let result = if failures.is_empty() {
                    None
                } else {
                    Some(TerminationError { failures })
                };
                *self.lock() = Phase::Terminated(result.clone());
                self.done.notify_waiters();
                result
            }
            None => loop {
                // Another caller is running the hooks; wait for its outcome.
                let notified = self.done.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                if let Phase::Terminated(result) = &*self.lock() {
                    return result.clone();
                }
                notified.await;
            },
        }
    }
}
