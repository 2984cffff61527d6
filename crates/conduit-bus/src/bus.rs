//! # Bus
//!
//! The reference-counted coordination object.
//!
//! ## State
//!
//! - The conduits (message + shutdown) are built exactly once, lazily, by
//!   whichever operation touches the bus first. A `OnceLock` guards that
//!   construction, so every caller observes fully built conduits.
//! - The sender count, the terminated flag and the bus-owned conduit ends
//!   live behind one mutex. Only connect and disconnect mutate them.
//!
//! ## Termination
//!
//! The bus owns the only strong end of both conduits. When the sender count
//! drops to zero it releases them: the message conduit reports end-of-stream
//! to every receiver and the shutdown signal resolves for every observer.
//! Sends still blocked at that moment are abandoned and hand their message
//! back. Termination is irreversible.

use crate::config::BusConfig;
use crate::error::BusError;
use crate::parcel::Parcel;
use crate::receiver::Receiver;
use crate::sender::{Disconnect, Sender};
use crate::shutdown::ShutdownSignal;
use crate::Envelope;
use parking_lot::Mutex;
use serde::Serialize;
use std::convert::Infallible;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, info, trace, warn};

/// A single-conduit bus shared by any number of senders and receivers.
///
/// Share it by reference (scoped threads) or behind an `Arc`. The handles it
/// hands out own their share of the bus internals and are `'static`.
///
/// The payload type defaults to [`Envelope`], an opaque boxed value.
pub struct Bus<T = Envelope> {
    config: BusConfig,
    core: OnceLock<Arc<Core<T>>>,
}

/// Point-in-time view of the bus bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusStats {
    /// Senders currently attached.
    pub senders: u32,
    /// Whether the bus has shut down.
    pub terminated: bool,
    /// Successful sender connects over the bus lifetime.
    pub total_connects: u64,
    /// Sender connects refused because the bus had terminated.
    pub rejected_connects: u64,
    /// Sender disconnects over the bus lifetime.
    pub total_disconnects: u64,
}

impl<T> Bus<T> {
    /// Create a bus with the default configuration.
    ///
    /// No conduit is allocated until the first connect or monitor call.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: BusConfig::default(),
            core: OnceLock::new(),
        }
    }

    /// Create a bus with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `BusError::InvalidConfig` if the configuration is rejected.
    pub fn with_config(config: BusConfig) -> Result<Self, BusError> {
        config.validate()?;
        Ok(Self {
            config,
            core: OnceLock::new(),
        })
    }

    /// Get the bus configuration.
    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Attach a sender.
    ///
    /// Returns the write handle and the sender's [`Disconnect`]. Every
    /// successful connect must be paired with exactly one release of its
    /// `Disconnect`; the last release shuts the bus down.
    ///
    /// The returned handle blocks on send until a receiver is ready.
    ///
    /// # Errors
    ///
    /// Returns `BusError::Terminated` if the bus already shut down.
    ///
    /// # Panics
    ///
    /// Panics if `max_senders` senders are already attached.
    pub fn sender_connect(&self) -> Result<(Sender<T>, Disconnect<T>), BusError> {
        let core = self.core();
        core.attach_sender()?;
        Ok((Sender::new(Arc::clone(core)), Disconnect::new(Arc::clone(core))))
    }

    /// Attach a receiver.
    ///
    /// Never fails. Attached after shutdown, the receiver is already closed
    /// and reads report end-of-stream without blocking, even while a send
    /// abandoned by the shutdown is still unwinding. There is no receiver
    /// disconnect: drop the handle when done.
    pub fn receiver_connect(&self) -> Receiver<T> {
        let core = self.core();
        debug!(bus = %core.name, "Receiver connected");
        Receiver::new(core.inbound())
    }

    /// Get a signal that resolves once the bus has terminated.
    ///
    /// Safe to call any number of times, including after termination.
    pub fn shutdown_monitor(&self) -> ShutdownSignal {
        ShutdownSignal::new(self.core().shutdown.clone())
    }

    /// Snapshot the bus bookkeeping.
    #[must_use]
    pub fn stats(&self) -> BusStats {
        self.core().stats()
    }

    /// One-shot lazy construction of the conduits.
    fn core(&self) -> &Arc<Core<T>> {
        self.core.get_or_init(|| Arc::new(Core::new(&self.config)))
    }
}

impl<T> Default for Bus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Bus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("config", &self.config)
            .field("initialized", &self.core.get().is_some())
            .finish()
    }
}

/// Conduits and bookkeeping, built once per bus.
pub(crate) struct Core<T> {
    name: String,
    max_senders: u32,
    lifecycle: Mutex<Lifecycle<T>>,
    /// Bus-held receive end, cloned for every receiver.
    messages: flume::Receiver<Parcel<T>>,
    /// Weak send end; upgrades fail once the bus terminated.
    outbound: flume::WeakSender<Parcel<T>>,
    shutdown: flume::Receiver<Infallible>,
}

/// Mutable state guarded by the bus lock.
struct Lifecycle<T> {
    senders: u32,
    terminated: bool,
    /// The only strong message sender. Dropped at termination.
    conduit: Option<flume::Sender<Parcel<T>>>,
    /// The only shutdown sender. Dropped at termination.
    shutdown: Option<flume::Sender<Infallible>>,
    total_connects: u64,
    rejected_connects: u64,
    total_disconnects: u64,
}

impl<T> Core<T> {
    fn new(config: &BusConfig) -> Self {
        let (conduit, messages) = flume::bounded(0);
        let (shutdown_tx, shutdown) = flume::bounded(0);
        let outbound = conduit.downgrade();

        trace!(bus = %config.name, "Bus conduits initialized");

        Self {
            name: config.name.clone(),
            max_senders: config.max_senders,
            lifecycle: Mutex::new(Lifecycle {
                senders: 0,
                terminated: false,
                conduit: Some(conduit),
                shutdown: Some(shutdown_tx),
                total_connects: 0,
                rejected_connects: 0,
                total_disconnects: 0,
            }),
            messages,
            outbound,
            shutdown,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// A strong send end for the duration of one send, if still open.
    pub(crate) fn outbound(&self) -> Option<flume::Sender<Parcel<T>>> {
        self.outbound.upgrade()
    }

    /// Receive end for a new receiver. Once terminated, a fresh conduit
    /// that is closed from the start.
    fn inbound(&self) -> flume::Receiver<Parcel<T>> {
        if self.is_terminated() {
            let (_, closed) = flume::bounded(0);
            return closed;
        }
        self.messages.clone()
    }

    /// Disconnects (never yields) once the bus terminated.
    pub(crate) fn shutdown(&self) -> &flume::Receiver<Infallible> {
        &self.shutdown
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.lifecycle.lock().terminated
    }

    fn attach_sender(&self) -> Result<(), BusError> {
        let mut state = self.lifecycle.lock();

        if state.terminated {
            state.rejected_connects += 1;
            warn!(bus = %self.name, "Sender connect rejected (bus terminated)");
            return Err(BusError::Terminated);
        }

        if state.senders >= self.max_senders {
            error!(
                bus = %self.name,
                max_senders = self.max_senders,
                "Sender counter exhausted"
            );
            panic!("too many senders on bus");
        }

        state.senders += 1;
        state.total_connects += 1;
        debug!(bus = %self.name, senders = state.senders, "Sender connected");
        Ok(())
    }

    /// Release one sender share; the last one closes both conduits.
    ///
    /// Runs exactly once per successful connect. A second run for the same
    /// connect drives the count below zero and panics.
    pub(crate) fn cooperative_termination(&self) {
        let mut state = self.lifecycle.lock();

        let Some(remaining) = state.senders.checked_sub(1) else {
            error!(bus = %self.name, "Sender disconnected more times than it connected");
            panic!("logic error: one too many disconnects");
        };
        state.senders = remaining;
        state.total_disconnects += 1;

        if remaining > 0 {
            debug!(bus = %self.name, senders = remaining, "Sender disconnected");
            return;
        }

        drop(state.conduit.take());
        drop(state.shutdown.take());
        state.terminated = true;
        info!(
            bus = %self.name,
            connects = state.total_connects,
            "Last sender disconnected, bus terminated"
        );
    }

    fn stats(&self) -> BusStats {
        let state = self.lifecycle.lock();
        BusStats {
            senders: state.senders,
            terminated: state.terminated,
            total_connects: state.total_connects,
            rejected_connects: state.rejected_connects,
            total_disconnects: state.total_disconnects,
        }
    }
}
