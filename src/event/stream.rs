use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};

use crate::error::{QueryError, QueryResult, StreamError};

use super::emitter::Subscription;
use super::notice::{ChangeNotice, SubscriptionId};

/// A pull-style subscription to change broadcasts.
///
/// Each broadcast enqueues one [`ChangeNotice`] into a bounded buffer. A full
/// buffer drops the notice instead of blocking the broadcaster; the drop is
/// counted in [`dropped`](Self::dropped).
///
/// Dropping this stream unsubscribes.
#[derive(Debug)]
pub struct ChangeStream {
    subscription: Subscription,
    rx: Receiver<ChangeNotice>,
    pub(crate) dropped: Rc<Cell<u64>>,
}

impl ChangeStream {
    pub(crate) fn new(
        subscription: Subscription,
        rx: Receiver<ChangeNotice>,
        dropped: Rc<Cell<u64>>,
    ) -> Self {
        Self {
            subscription,
            rx,
            dropped,
        }
    }

    /// The subscription id backing this stream.
    #[must_use]
    pub const fn subscription_id(&self) -> SubscriptionId {
        self.subscription.id()
    }

    /// Explicit unregistration. Idempotent.
    ///
    /// Notices already buffered remain readable.
    pub fn unsubscribe(&self) {
        self.subscription.unsubscribe();
    }

    /// Number of notices discarded because the buffer was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.get()
    }

    /// Number of buffered notices.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Take the next buffered notice without waiting.
    ///
    /// # Errors
    ///
    /// [`StreamError::Empty`] when nothing is buffered,
    /// [`StreamError::Disconnected`] once the list is gone.
    pub fn try_recv(&self) -> QueryResult<ChangeNotice> {
        self.rx.try_recv().map_err(|err| match err {
            TryRecvError::Empty => QueryError::Stream(StreamError::Empty),
            TryRecvError::Disconnected => self.disconnected(),
        })
    }

    /// Take the next notice, or learn that none will ever arrive.
    ///
    /// Broadcasts run on the owner's thread, so a live list can never fill an
    /// empty buffer while this call waits. In that case this returns
    /// [`StreamError::Empty`] instead of blocking. Once the list is dropped or
    /// the stream unsubscribed, buffered notices drain first and then
    /// [`StreamError::Disconnected`] is returned.
    ///
    /// # Errors
    ///
    /// [`StreamError::Empty`] or [`StreamError::Disconnected`], as above.
    pub fn recv(&self) -> QueryResult<ChangeNotice> {
        if self.rx.is_empty() && self.subscription.is_active() {
            return Err(QueryError::Stream(StreamError::Empty));
        }
        self.rx.recv().map_err(|_| self.disconnected())
    }

    /// Receive the next notice with a timeout.
    ///
    /// # Errors
    ///
    /// [`StreamError::Timeout`] or [`StreamError::Disconnected`].
    pub fn recv_timeout(&self, timeout: Duration) -> QueryResult<ChangeNotice> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => QueryError::Stream(StreamError::Timeout {
                duration_ms: timeout.as_millis().min(u128::from(u64::MAX)) as u64,
            }),
            RecvTimeoutError::Disconnected => self.disconnected(),
        })
    }

    /// Drain every buffered notice.
    pub fn drain(&self) -> Vec<ChangeNotice> {
        self.rx.try_iter().collect()
    }

    fn disconnected(&self) -> QueryError {
        QueryError::Stream(StreamError::Disconnected {
            subscription_id: self.subscription.id(),
        })
    }
}

impl Drop for ChangeStream {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}
