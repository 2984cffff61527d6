//! Error types for the conduit bus.
//!
//! Only expected conditions live here. Accounting faults (sender counter
//! overflow, one disconnect too many) are not errors: they panic.

use std::fmt;
use thiserror::Error;

/// Errors from bus operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The last sender already disconnected; no new sender may attach.
    #[error("Bus terminated")]
    Terminated,

    /// The supplied configuration was rejected.
    #[error("Invalid bus configuration: {0}")]
    InvalidConfig(String),
}

/// A send on a terminated bus. Carries the undelivered message.
#[derive(Clone, PartialEq, Eq, Error)]
#[error("Sending on a terminated bus")]
pub struct SendError<T>(pub T);

impl<T> SendError<T> {
    /// Recover the message that could not be sent.
    pub fn into_inner(self) -> T {
        self.0
    }
}

// Payloads are opaque, so Debug must not require `T: Debug`.
impl<T> fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SendError(..)")
    }
}

/// Errors from a non-blocking receive.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TryRecvError {
    /// No sender is currently offering a message.
    #[error("No message ready")]
    Empty,

    /// The bus terminated; no further messages will arrive.
    #[error("Bus closed")]
    Closed,
}
