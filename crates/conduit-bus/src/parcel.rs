//! # Parcel
//!
//! Single-use hand-off cell carried across the conduit.
//!
//! A send blocked when the bus terminates is abandoned and the sender takes
//! its message back. The receiving side may already hold the parcel at that
//! point, so the payload itself is claimed under a lock: whichever side takes
//! it first owns the message. It is delivered or returned, never both.

use parking_lot::Mutex;
use std::sync::Arc;

pub(crate) struct Parcel<T>(Arc<Mutex<Option<T>>>);

impl<T> Parcel<T> {
    pub(crate) fn new(msg: T) -> Self {
        Self(Arc::new(Mutex::new(Some(msg))))
    }

    /// Claim the payload. `None` if the other side got there first.
    pub(crate) fn take(&self) -> Option<T> {
        self.0.lock().take()
    }
}

impl<T> Clone for Parcel<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}
