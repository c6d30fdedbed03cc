//! Synchronous broadcast emitter.
//!
//! # Invariants
//!
//! 1. Observers are invoked in subscription order.
//! 2. Each broadcast dispatches to a snapshot of the observers registered when
//!    it started. Subscribing or unsubscribing from inside an observer only
//!    affects later broadcasts.
//! 3. The first observer error aborts the rest of the broadcast and is returned
//!    to the emitting caller unmodified.
//! 4. Nothing is replayed: an observer only sees broadcasts that start after it
//!    subscribed.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::ObserverError;

use super::notice::SubscriptionId;

type Observer<E> = Rc<dyn Fn(&E) -> Result<(), ObserverError>>;

struct Registry<E> {
    entries: Vec<(SubscriptionId, Observer<E>)>,
}

/// Type-erased view of a registry, so `Subscription` need not carry `E`.
trait Unregister {
    fn remove(&self, id: SubscriptionId) -> bool;
    fn contains(&self, id: SubscriptionId) -> bool;
}

impl<E> Unregister for RefCell<Registry<E>> {
    fn remove(&self, id: SubscriptionId) -> bool {
        // Drop the observer only after the borrow ends; its captures may
        // touch this registry when dropped.
        let removed = {
            let mut registry = self.borrow_mut();
            registry
                .entries
                .iter()
                .position(|(entry_id, _)| *entry_id == id)
                .map(|idx| registry.entries.remove(idx))
        };
        removed.is_some()
    }

    fn contains(&self, id: SubscriptionId) -> bool {
        self.borrow().entries.iter().any(|(entry_id, _)| *entry_id == id)
    }
}

/// Ordered set of observers invoked synchronously on every [`emit`](Self::emit).
///
/// Single-threaded: the registry lives behind `Rc<RefCell<..>>`.
pub struct EventEmitter<E> {
    registry: Rc<RefCell<Registry<E>>>,
}

impl<E: 'static> EventEmitter<E> {
    /// Create an emitter with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry { entries: Vec::new() })),
        }
    }

    /// Register `observer` for all future broadcasts.
    ///
    /// The observer stays registered until [`Subscription::unsubscribe`] is
    /// called or the emitter is dropped. Dropping the handle alone does not
    /// unsubscribe.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&E) -> Result<(), ObserverError> + 'static,
    {
        self.subscribe_with_id(SubscriptionId::new(), observer)
    }

    /// Like [`subscribe`](Self::subscribe), under an id chosen by the caller
    /// so the observer can know its own id. `id` must be fresh.
    pub(crate) fn subscribe_with_id<F>(&self, id: SubscriptionId, observer: F) -> Subscription
    where
        F: Fn(&E) -> Result<(), ObserverError> + 'static,
    {
        self.registry
            .borrow_mut()
            .entries
            .push((id, Rc::new(observer)));

        let weak: Weak<RefCell<Registry<E>>> = Rc::downgrade(&self.registry);
        let registry: Weak<dyn Unregister> = weak;
        tracing::trace!(subscription_id = %id, "observer subscribed");

        Subscription {
            id,
            registry,
            active: Cell::new(true),
        }
    }

    /// Broadcast `event` to every currently registered observer.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by an observer. Observers after the
    /// failing one are not invoked for this broadcast.
    pub fn emit(&self, event: &E) -> Result<(), ObserverError> {
        let snapshot: Vec<(SubscriptionId, Observer<E>)> = self.registry.borrow().entries.clone();
        tracing::trace!(observers = snapshot.len(), "broadcasting change");

        for (id, observer) in snapshot {
            if let Err(err) = observer(event) {
                tracing::debug!(
                    subscription_id = %id,
                    error = %err,
                    "observer failed; broadcast aborted"
                );
                return Err(err);
            }
        }
        Ok(())
    }

    /// Number of observers that will receive the next broadcast.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().entries.len()
    }
}

impl<E: 'static> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("subscribers", &self.registry.borrow().entries.len())
            .finish()
    }
}

/// Handle returned by [`EventEmitter::subscribe`].
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<dyn Unregister>,
    active: Cell<bool>,
}

impl Subscription {
    /// The id of this subscription.
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Stop receiving future broadcasts. Idempotent.
    ///
    /// A broadcast already in progress still reaches this observer if it was
    /// part of that broadcast's snapshot.
    pub fn unsubscribe(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(self.id) {
                tracing::trace!(subscription_id = %self.id, "observer unsubscribed");
            }
        }
    }

    /// True while the observer is registered on a live emitter.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get()
            && self
                .registry
                .upgrade()
                .is_some_and(|registry| registry.contains(self.id))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active.get())
            .finish()
    }
}
