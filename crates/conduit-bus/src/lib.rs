//! # Conduit Bus - Reference-Counted Rendezvous Bus
//!
//! Streams arbitrary messages between any number of senders and receivers
//! over one shared, zero-capacity conduit.
//!
//! ## Lifecycle
//!
//! ```text
//!   Bus::new()          first connect / monitor        last Disconnect
//! ┌─────────────┐      ┌──────────────────────┐      ┌──────────────┐
//! │Uninitialized│ ───▶ │        Active        │ ───▶ │  Terminated  │
//! │ no conduits │      │ senders >= 0         │      │ conduits     │
//! └─────────────┘      └──────────────────────┘      │ closed       │
//!                                                     └──────────────┘
//! ```
//!
//! ## Semantics
//!
//! - **No addressing:** any ready receiver takes the next message. Try to
//!   avoid message loops when one unit of concurrency is both a sender and a
//!   receiver.
//! - **Unbuffered:** a send blocks until a receiver takes the message, and a
//!   receive blocks until a sender offers one.
//! - **Cooperatively owned:** the bus shuts down when the last sender
//!   disconnects. Receivers are not counted; they simply stop reading.
//! - **After shutdown:** `sender_connect` fails with [`BusError::Terminated`],
//!   while `receiver_connect` still succeeds and yields a closed receiver.
//!   A send still blocked at shutdown returns its message in a [`SendError`].
//!
//! Connect every intended sender before starting receivers (or otherwise
//! establish a happens-before edge) so that no intended sender loses the race
//! with shutdown.
//!
//! ## Usage Example
//!
//! ```
//! use conduit_bus::Bus;
//! use std::thread;
//!
//! let bus: Bus<u32> = Bus::new();
//!
//! let (tx, disconnect) = bus.sender_connect().expect("bus is active");
//! let producer = thread::spawn(move || {
//!     for i in 0..3 {
//!         tx.send(i).expect("bus is active");
//!     }
//!     disconnect.disconnect();
//! });
//!
//! let received: Vec<u32> = bus.receiver_connect().into_iter().collect();
//! producer.join().unwrap();
//!
//! assert_eq!(received, vec![0, 1, 2]);
//! assert!(bus.shutdown_monitor().is_shutdown());
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod config;
pub mod error;
mod parcel;
pub mod receiver;
pub mod sender;
pub mod shutdown;

use std::any::Any;

// Re-export main types
pub use bus::{Bus, BusStats};
pub use config::BusConfig;
pub use error::{BusError, SendError, TryRecvError};
pub use receiver::Receiver;
pub use sender::{Disconnect, Sender};
pub use shutdown::ShutdownSignal;

/// Opaque payload type used when a bus carries messages of mixed types.
///
/// Receivers recover the concrete type with `downcast` / `downcast_ref`.
pub type Envelope = Box<dyn Any + Send>;

/// Default bus name used in log events.
pub const DEFAULT_BUS_NAME: &str = "bus";

/// Default upper bound of the sender counter (a 32-bit signed counter).
pub const DEFAULT_MAX_SENDERS: u32 = i32::MAX as u32;
