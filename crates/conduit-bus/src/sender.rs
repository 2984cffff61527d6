//! # Sender
//!
//! The producing side of the bus, obtained from [`Bus::sender_connect`].
//!
//! A successful connect yields two values:
//!
//! - [`Sender`]: a write-only handle to the shared conduit. Every sender on a
//!   bus writes to the same conduit; cloning the handle does not register a
//!   new sender.
//! - [`Disconnect`]: the sender's share of bus ownership. Releasing it
//!   (explicitly via [`Disconnect::disconnect`] or by dropping it) tells the
//!   bus this sender is done. The last release shuts the bus down.
//!
//! Leaking a `Disconnect` (for example with `std::mem::forget`) keeps the bus
//! active forever.
//!
//! [`Bus::sender_connect`]: crate::Bus::sender_connect

use crate::bus::Core;
use crate::error::SendError;
use crate::parcel::Parcel;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Write-only handle to the bus conduit.
///
/// Reaches the conduit only through a weak reference: once the bus
/// terminates the handle can no longer keep it open, and sends fail with
/// [`SendError`]. Sends also watch the shutdown signal, so a send blocked
/// at termination returns instead of waiting for a receiver.
pub struct Sender<T> {
    core: Arc<Core<T>>,
}

impl<T> Sender<T> {
    pub(crate) fn new(core: Arc<Core<T>>) -> Self {
        Self { core }
    }

    /// Send a message, blocking until a receiver takes it.
    ///
    /// A send still waiting for a receiver when the bus terminates is
    /// abandoned.
    ///
    /// # Errors
    ///
    /// Returns the message inside [`SendError`] if the bus has terminated.
    pub fn send(&self, msg: T) -> Result<(), SendError<T>> {
        let Some(conduit) = self.core.outbound() else {
            trace!(bus = %self.core.name(), "Send rejected (bus terminated)");
            return Err(SendError(msg));
        };
        let parcel = Parcel::new(msg);

        let delivered = flume::Selector::new()
            .send(&conduit, parcel.clone(), |sent| sent.is_ok())
            .recv(self.core.shutdown(), |_| false)
            .wait();

        // Release the strong end so the conduit can close behind us.
        drop(conduit);
        self.settle(parcel, delivered)
    }

    /// Send a message asynchronously, resolving once a receiver takes it.
    ///
    /// Like [`Sender::send`], a pending send is abandoned when the bus
    /// terminates.
    ///
    /// # Errors
    ///
    /// Returns the message inside [`SendError`] if the bus has terminated.
    pub async fn send_async(&self, msg: T) -> Result<(), SendError<T>> {
        let Some(conduit) = self.core.outbound() else {
            trace!(bus = %self.core.name(), "Send rejected (bus terminated)");
            return Err(SendError(msg));
        };
        let parcel = Parcel::new(msg);

        let delivered = tokio::select! {
            sent = conduit.send_async(parcel.clone()) => sent.is_ok(),
            _ = self.core.shutdown().recv_async() => false,
        };

        drop(conduit);
        self.settle(parcel, delivered)
    }

    /// Resolve a finished send. An undelivered parcel is reclaimed unless a
    /// receiver already claimed its payload.
    fn settle(&self, parcel: Parcel<T>, delivered: bool) -> Result<(), SendError<T>> {
        if delivered {
            return Ok(());
        }
        match parcel.take() {
            Some(msg) => {
                trace!(bus = %self.core.name(), "Send abandoned (bus terminated)");
                Err(SendError(msg))
            }
            None => Ok(()),
        }
    }

    /// Whether the bus has terminated.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.core.is_terminated()
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T> fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("bus", &self.core.name())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// A sender's share of bus ownership.
///
/// Exactly one `Disconnect` exists per successful connect. It is consumed by
/// [`Disconnect::disconnect`] and released automatically on drop, so a
/// sender thread that panics still lets the bus shut down.
#[must_use = "dropping the Disconnect immediately detaches the sender"]
pub struct Disconnect<T> {
    core: Arc<Core<T>>,
}

impl<T> Disconnect<T> {
    pub(crate) fn new(core: Arc<Core<T>>) -> Self {
        Self { core }
    }

    /// Detach this sender from the bus.
    ///
    /// When it is the last attached sender, the bus terminates: the conduit
    /// closes and the shutdown signal resolves.
    pub fn disconnect(self) {
        drop(self);
    }
}

impl<T> Drop for Disconnect<T> {
    fn drop(&mut self) {
        self.core.cooperative_termination();
    }
}

impl<T> fmt::Debug for Disconnect<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disconnect")
            .field("bus", &self.core.name())
            .finish()
    }
}
