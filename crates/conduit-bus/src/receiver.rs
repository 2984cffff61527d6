//! # Receiver
//!
//! The consuming side of the bus. Receivers are not reference counted: there
//! is no disconnect, a receiver simply stops reading. When the bus
//! terminates every receiver, including ones attached afterwards, observes
//! end-of-stream instead of blocking.
//!
//! If several receivers are attached, each message goes to exactly one of
//! them. To avoid message loops, every receiver should handle every message
//! type produced by every sender on the bus.

use crate::error::TryRecvError;
use crate::parcel::Parcel;
use tokio_stream::{Stream, StreamExt};

/// Read-only handle to the bus conduit.
pub struct Receiver<T> {
    inner: flume::Receiver<Parcel<T>>,
}

impl<T> Receiver<T> {
    pub(crate) fn new(inner: flume::Receiver<Parcel<T>>) -> Self {
        Self { inner }
    }

    /// Receive the next message, blocking until a sender offers one.
    ///
    /// # Returns
    ///
    /// - `Some(msg)` - The next message
    /// - `None` - The bus terminated
    pub fn recv(&self) -> Option<T> {
        loop {
            // Empty parcels were reclaimed by a send abandoned at shutdown.
            if let Some(msg) = self.inner.recv().ok()?.take() {
                return Some(msg);
            }
        }
    }

    /// Receive the next message asynchronously.
    ///
    /// Resolves to `None` once the bus terminated.
    pub async fn recv_async(&self) -> Option<T> {
        loop {
            if let Some(msg) = self.inner.recv_async().await.ok()?.take() {
                return Some(msg);
            }
        }
    }

    /// Take a message only if a sender is blocked offering one right now.
    ///
    /// # Returns
    ///
    /// - `Ok(msg)` - A sender was ready
    /// - `Err(TryRecvError::Empty)` - No sender ready
    /// - `Err(TryRecvError::Closed)` - The bus terminated
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        loop {
            let parcel = self.inner.try_recv().map_err(|e| match e {
                flume::TryRecvError::Empty => TryRecvError::Empty,
                flume::TryRecvError::Disconnected => TryRecvError::Closed,
            })?;
            if let Some(msg) = parcel.take() {
                return Ok(msg);
            }
        }
    }

    /// Whether the bus terminated and no in-flight send remains.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_disconnected()
    }

    /// Blocking iterator that drains messages until the bus terminates.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { receiver: self }
    }

    /// Stream of messages that ends when the bus terminates.
    pub fn stream(&self) -> impl Stream<Item = T> + '_ {
        self.inner.stream().filter_map(|parcel| parcel.take())
    }

    /// Owned variant of [`Receiver::stream`].
    pub fn into_stream(self) -> impl Stream<Item = T> + 'static
    where
        T: 'static,
    {
        self.inner.into_stream().filter_map(|parcel| parcel.take())
    }
}

impl<T> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receiver")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Borrowing blocking iterator, see [`Receiver::iter`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    receiver: &'a Receiver<T>,
}

impl<T> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.receiver.recv()
    }
}

/// Owning blocking iterator, from `Receiver::into_iter`.
#[derive(Debug)]
pub struct IntoIter<T> {
    receiver: Receiver<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.receiver.recv()
    }
}

impl<T> IntoIterator for Receiver<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { receiver: self }
    }
}

impl<'a, T> IntoIterator for &'a Receiver<T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
