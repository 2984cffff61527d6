//! # Shutdown Signal
//!
//! Lets observers that are not interested in messages learn when a bus has
//! terminated. The signal carries no value: the underlying conduit is typed
//! over [`Infallible`], so the only thing it can ever report is that it was
//! closed.
//!
//! A resolved signal means every sender has disconnected. Receivers may
//! still be draining the last hand-offs.

use std::convert::Infallible;

/// Read-only handle to a bus's termination signal.
#[derive(Clone, Debug)]
pub struct ShutdownSignal {
    closed: flume::Receiver<Infallible>,
}

impl ShutdownSignal {
    pub(crate) fn new(closed: flume::Receiver<Infallible>) -> Self {
        Self { closed }
    }

    /// Block until the bus terminates. Returns immediately once it has.
    pub fn wait(&self) {
        match self.closed.recv() {
            Ok(never) => match never {},
            Err(flume::RecvError::Disconnected) => {}
        }
    }

    /// Wait asynchronously until the bus terminates.
    pub async fn wait_async(&self) {
        match self.closed.recv_async().await {
            Ok(never) => match never {},
            Err(flume::RecvError::Disconnected) => {}
        }
    }

    /// Non-blocking check for termination.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.closed.is_disconnected()
    }
}
