//! Hosting engine readiness state.
//!
//! The status lives in a `watch` channel: readers borrow the current value on
//! the request path, and transports can wait for transitions.

use std::fmt;

use tokio::sync::watch;
use tracing::info;

use crate::error::InvocationError;

/// Engine status.
///
/// State machine: Starting -> Up -> Stopping -> Down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// Registering schemas and binding operations; not accepting requests.
    Starting,
    /// Fully operational.
    Up,
    /// Shutting down; no new requests accepted.
    Stopping,
    /// Stopped.
    Down,
}

impl EngineStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EngineStatus::Starting => "starting",
            EngineStatus::Up => "up",
            EngineStatus::Stopping => "stopping",
            EngineStatus::Down => "down",
        }
    }
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared readiness state of the hosting engine.
///
/// Written by the engine lifecycle, read by every provider invocation.
#[derive(Debug)]
pub struct EngineState {
    status: watch::Sender<EngineStatus>,
}

impl EngineState {
    /// Creates a state in `Starting`.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(EngineStatus::Starting);
        Self { status: tx }
    }

    #[must_use]
    pub fn status(&self) -> EngineStatus {
        *self.status.borrow()
    }

    #[must_use]
    pub fn is_up(&self) -> bool {
        self.status() == EngineStatus::Up
    }

    /// Stores `status` and notifies subscribers. The channel holds the only
    /// copy of the status.
    pub fn set_status(&self, status: EngineStatus) {
        let previous = self.status.send_replace(status);
        if previous != status {
            info!(from = %previous, to = %status, "engine status changed");
        }
    }

    /// Transitions to `Up`: provider invocations are accepted from now on.
    pub fn mark_up(&self) {
        self.set_status(EngineStatus::Up);
    }

    /// Transitions to `Stopping`: new provider invocations are rejected.
    pub fn begin_shutdown(&self) {
        self.set_status(EngineStatus::Stopping);
    }

    pub fn mark_down(&self) {
        self.set_status(EngineStatus::Down);
    }

    /// Returns a receiver notified on every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<EngineStatus> {
        self.status.subscribe()
    }

    /// # Errors
    ///
    /// Returns `InvocationError::NotReady` unless the status is `Up`.
    pub fn ensure_status_up(&self) -> Result<(), InvocationError> {
        match self.status() {
            EngineStatus::Up => Ok(()),
            status => Err(InvocationError::NotReady { status }),
        }
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new()
    }
}
