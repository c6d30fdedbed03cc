//! The tracked query result list.
//!
//! A [`QueryList`] holds the current ordered result set of a query and
//! broadcasts a change event when its owner says so. Consumers only ever see
//! `&QueryList<T>`: they can read, iterate and derive views, or subscribe to
//! changes. The owner holds the list by value and is the only party able to
//! [`reset`](QueryList::reset) it.
//!
//! `reset` and [`notify_change`](QueryList::notify_change) are independent.
//! An owner may batch several resets before one broadcast, or broadcast
//! without resetting to force observers to re-read.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use querylist::QueryList;
//!
//! let mut items: QueryList<&str> = QueryList::new();
//! let seen = Rc::new(Cell::new(0));
//! let seen_by_observer = Rc::clone(&seen);
//! let sub = items.subscribe(move |list| {
//!     seen_by_observer.set(list.len());
//!     Ok(())
//! });
//!
//! items.reset(["a", "b", "c"]);
//! items.notify_change().unwrap();
//! assert_eq!(seen.get(), 3);
//! assert_eq!(items.to_string(), "a,b,c");
//! sub.unsubscribe();
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crossbeam_channel::{bounded, TrySendError};

use crate::config::ChangeStreamConfig;
use crate::error::{ObserverError, QueryResult};
use crate::event::{ChangeNotice, ChangeStream, EventEmitter, Subscription, SubscriptionId};

/// An ordered list of query results, kept up to date by its owner.
///
/// Duplicates are allowed. The item sequence is only ever replaced as a
/// whole.
pub struct QueryList<T: 'static> {
    results: Vec<T>,
    version: u64,
    changes: EventEmitter<QueryList<T>>,
}

impl<T: 'static> QueryList<T> {
    /// Create an empty list with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            version: 0,
            changes: EventEmitter::new(),
        }
    }

    /// The change emitter. Observers receive the list itself.
    #[must_use]
    pub fn changes(&self) -> &EventEmitter<Self> {
        &self.changes
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True when the list holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// First item, or `None` when empty.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.results.first()
    }

    /// Last item, or `None` when empty.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.results.last()
    }

    /// Item at `index`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.results.get(index)
    }

    /// Number of resets applied since creation.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Applies `transform` to each item, left to right.
    pub fn map<U, F>(&self, transform: F) -> Vec<U>
    where
        F: FnMut(&T) -> U,
    {
        self.results.iter().map(transform).collect()
    }

    /// Items for which `predicate` holds, in list order.
    pub fn filter<P>(&self, mut predicate: P) -> Vec<T>
    where
        T: Clone,
        P: FnMut(&T) -> bool,
    {
        self.results
            .iter()
            .filter(|item| predicate(*item))
            .cloned()
            .collect()
    }

    /// Left fold over the items, starting from `initial`.
    pub fn reduce<U, F>(&self, combine: F, initial: U) -> U
    where
        F: FnMut(U, &T) -> U,
    {
        self.results.iter().fold(initial, combine)
    }

    /// Calls `visit` once per item, in order.
    pub fn for_each<F>(&self, visit: F)
    where
        F: FnMut(&T),
    {
        self.results.iter().for_each(visit);
    }

    /// Like [`map`](Self::map), stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `transform`, unmodified.
    pub fn try_map<U, E, F>(&self, transform: F) -> Result<Vec<U>, E>
    where
        F: FnMut(&T) -> Result<U, E>,
    {
        self.results.iter().map(transform).collect()
    }

    /// Like [`for_each`](Self::for_each), stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `visit`, unmodified.
    pub fn try_for_each<E, F>(&self, visit: F) -> Result<(), E>
    where
        F: FnMut(&T) -> Result<(), E>,
    {
        self.results.iter().try_for_each(visit)
    }

    /// Like [`reduce`](Self::reduce), stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `combine`, unmodified.
    pub fn try_reduce<U, E, F>(&self, combine: F, initial: U) -> Result<U, E>
    where
        F: FnMut(U, &T) -> Result<U, E>,
    {
        self.results.iter().try_fold(initial, combine)
    }

    /// An independent copy of the current items.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.results.clone()
    }

    /// Borrow the current items.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.results
    }

    /// Iterate the items as they are when iteration starts.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.results.iter()
    }

    /// Replace every item at once. Owner-only; does not notify.
    pub fn reset<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.results = items.into_iter().collect();
        self.version += 1;
        tracing::trace!(len = self.results.len(), version = self.version, "query list reset");
    }

    /// Broadcast a change to all current subscribers. Owner-only.
    ///
    /// Observers run synchronously, in subscription order, and receive this
    /// list. No diff is attached; observers re-read what they need.
    ///
    /// # Errors
    ///
    /// The first observer error stops the broadcast and is returned
    /// unmodified. Observers later in the order are not called.
    pub fn notify_change(&self) -> Result<(), ObserverError> {
        self.changes.emit(self)
    }

    /// Register `observer` for every future [`notify_change`](Self::notify_change).
    ///
    /// Past broadcasts are not replayed.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&Self) -> Result<(), ObserverError> + 'static,
    {
        self.changes.subscribe(observer)
    }

    /// Subscribe through a bounded buffer of [`ChangeNotice`]s.
    ///
    /// Broadcasts never block on a slow reader: a notice that does not fit is
    /// dropped and counted on the stream.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroValue`](crate::error::ConfigError::ZeroValue) when
    /// `config.capacity` is zero.
    pub fn change_stream(&self, config: &ChangeStreamConfig) -> QueryResult<ChangeStream> {
        config.validate()?;

        let (tx, rx) = bounded::<ChangeNotice>(config.capacity);
        let dropped = Rc::new(Cell::new(0u64));
        let counter = Rc::clone(&dropped);
        let subscription_id = SubscriptionId::new();

        let subscription = self.changes.subscribe_with_id(subscription_id, move |list: &Self| {
            let notice = ChangeNotice::new(subscription_id, list.version, list.len());
            match tx.try_send(notice) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    counter.set(counter.get() + 1);
                    tracing::debug!(
                        subscription_id = %subscription_id,
                        version = list.version,
                        "change stream full; notice dropped"
                    );
                }
                // The reader went away during this broadcast.
                Err(TrySendError::Disconnected(_)) => {
                    tracing::trace!(
                        subscription_id = %subscription_id,
                        "change stream closed; notice discarded"
                    );
                }
            }
            Ok(())
        });

        Ok(ChangeStream::new(subscription, rx, dropped))
    }
}

impl<T: 'static> Default for QueryList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> From<Vec<T>> for QueryList<T> {
    fn from(results: Vec<T>) -> Self {
        let mut list = Self::new();
        list.reset(results);
        list
    }
}

impl<'a, T: 'static> IntoIterator for &'a QueryList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for QueryList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryList")
            .field("results", &self.results)
            .field("version", &self.version)
            .field("subscribers", &self.changes.subscriber_count())
            .finish()
    }
}

/// Items joined with `,` and no padding; an empty list renders as `""`.
impl<T: fmt::Display + 'static> fmt::Display for QueryList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.results.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn new_list_is_empty() {
        let list: QueryList<u32> = QueryList::new();
        assert_eq!(list.len(), 0);
        assert!(list.is_empty());
        assert_eq!(list.first(), None);
        assert_eq!(list.last(), None);
        assert_eq!(list.version(), 0);
    }

    #[test]
    fn reset_replaces_wholesale() {
        let mut list = QueryList::new();
        list.reset(vec!['a', 'b', 'c']);
        assert_eq!(list.to_vec(), vec!['a', 'b', 'c']);

        list.reset(Vec::new());
        assert_eq!(list.len(), 0);
        assert_eq!(list.first(), None);
        assert_eq!(list.version(), 2);
    }

    #[test]
    fn duplicates_are_kept() {
        let list = QueryList::from(vec![1, 1, 2, 1]);
        assert_eq!(list.len(), 4);
        assert_eq!(list.filter(|v| *v == 1), vec![1, 1, 1]);
    }

    #[test]
    fn first_and_last() {
        let list = QueryList::from(vec!["x", "y", "z"]);
        assert_eq!(list.first(), Some(&"x"));
        assert_eq!(list.last(), Some(&"z"));
        assert_eq!(list.get(1), Some(&"y"));
        assert_eq!(list.get(3), None);
    }

    #[test]
    fn derived_views() {
        let list = QueryList::from(vec![1i32, 2, 3, 4]);
        assert_eq!(list.map(|v| v * 10), vec![10, 20, 30, 40]);
        assert_eq!(list.filter(|v| v % 2 == 0), vec![2, 4]);
        assert_eq!(list.reduce(|acc, v| acc + *v, 0), 10);
        assert_eq!(
            list.reduce(|acc: Vec<i32>, v| [vec![*v], acc].concat(), Vec::new()),
            vec![4, 3, 2, 1]
        );

        let mut visited = Vec::new();
        list.for_each(|v| visited.push(*v));
        assert_eq!(visited, vec![1, 2, 3, 4]);
    }

    #[test]
    fn reduce_on_empty_returns_initial() {
        let list: QueryList<u8> = QueryList::new();
        assert_eq!(list.reduce(|acc, v| acc + u32::from(*v), 7), 7);
    }

    #[test]
    fn try_variants_return_first_error() {
        let list = QueryList::from(vec![1i32, 2, 3]);
        let calls = Cell::new(0);

        let result: Result<Vec<i32>, String> = list.try_map(|v| {
            calls.set(calls.get() + 1);
            if *v == 2 {
                Err(format!("rejected {v}"))
            } else {
                Ok(*v)
            }
        });
        assert_eq!(result, Err("rejected 2".to_string()));
        assert_eq!(calls.get(), 2);

        let sum: Result<i32, &str> = list.try_reduce(|acc, v| Ok(acc + *v), 0);
        assert_eq!(sum, Ok(6));

        let visit: Result<(), &str> =
            list.try_for_each(|v| if *v == 3 { Err("three") } else { Ok(()) });
        assert_eq!(visit, Err("three"));
    }

    #[test]
    fn to_vec_is_a_copy() {
        let list = QueryList::from(vec![1, 2]);
        let mut copy = list.to_vec();
        copy.push(3);
        copy[0] = 99;
        assert_eq!(list.as_slice(), &[1, 2]);
    }

    #[test]
    fn iteration_restarts() {
        let list = QueryList::from(vec![5, 6]);
        let first_pass: Vec<_> = list.iter().copied().collect();
        let second_pass: Vec<_> = (&list).into_iter().copied().collect();
        assert_eq!(first_pass, second_pass);

        let mut total = 0;
        for v in &list {
            total += v;
        }
        assert_eq!(total, 11);
    }

    #[test]
    fn display_joins_with_commas() {
        assert_eq!(QueryList::from(vec![1, 2, 3]).to_string(), "1,2,3");
        assert_eq!(QueryList::<u8>::new().to_string(), "");
    }

    #[test]
    fn reset_does_not_notify() {
        let mut list = QueryList::new();
        let calls = Rc::new(Cell::new(0));
        let calls_clone = Rc::clone(&calls);
        let _sub = list.subscribe(move |_| {
            calls_clone.set(calls_clone.get() + 1);
            Ok(())
        });

        list.reset(vec![1]);
        list.reset(vec![2]);
        assert_eq!(calls.get(), 0);

        list.notify_change().unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn observer_sees_current_state() {
        let mut list = QueryList::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let _sub = list.subscribe(move |l: &QueryList<i32>| {
            seen_clone.borrow_mut().push((l.to_vec(), l.version()));
            Ok(())
        });

        list.reset(vec![1, 2]);
        list.notify_change().unwrap();
        list.notify_change().unwrap();
        assert_eq!(*seen.borrow(), vec![(vec![1, 2], 1), (vec![1, 2], 1)]);
    }

    #[test]
    fn subscribe_then_unsubscribe_scenario() {
        let mut list = QueryList::new();
        let calls = Rc::new(Cell::new(0));
        let calls_clone = Rc::clone(&calls);
        let obs1 = list.subscribe(move |_| {
            calls_clone.set(calls_clone.get() + 1);
            Ok(())
        });

        list.reset(vec![1, 2]);
        list.notify_change().unwrap();
        assert_eq!(calls.get(), 1);

        obs1.unsubscribe();
        list.reset(vec![3]);
        list.notify_change().unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn late_subscriber_gets_no_replay() {
        let mut list = QueryList::from(vec![1]);
        list.notify_change().unwrap();

        let calls = Rc::new(Cell::new(0));
        let calls_clone = Rc::clone(&calls);
        let _sub = list.subscribe(move |_| {
            calls_clone.set(calls_clone.get() + 1);
            Ok(())
        });
        assert_eq!(calls.get(), 0);

        list.reset(vec![2]);
        list.notify_change().unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn observer_error_propagates() {
        let list = QueryList::from(vec![1]);
        let _bad = list.subscribe(|l| {
            Err(ObserverError::new(format!("cannot handle {} items", l.len())))
        });
        let err = list.notify_change().unwrap_err();
        assert_eq!(err.message(), "cannot handle 1 items");
    }

    #[test]
    fn change_stream_counts_overflow() {
        let list = QueryList::from(vec!['q']);
        let stream = list.change_stream(&ChangeStreamConfig { capacity: 2 }).unwrap();

        for _ in 0..5 {
            list.notify_change().unwrap();
        }
        assert_eq!(stream.pending(), 2);
        assert_eq!(stream.dropped(), 3);

        let notices = stream.drain();
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|n| n.len == 1 && n.version == 1));
    }

    #[test]
    fn change_stream_rejects_zero_capacity() {
        let list = QueryList::from(vec![1u8]);
        let err = list.change_stream(&ChangeStreamConfig { capacity: 0 }).unwrap_err();
        assert!(err.is_config());
        assert_eq!(list.changes().subscriber_count(), 0);
    }

    #[test]
    fn change_notice_names_its_stream() {
        let list = QueryList::from(vec!["a", "b"]);
        let stream = list.change_stream(&ChangeStreamConfig::default()).unwrap();
        let other = list.change_stream(&ChangeStreamConfig::default()).unwrap();
        list.notify_change().unwrap();

        let notice = stream.try_recv().unwrap();
        assert_eq!(notice.subscription_id, stream.subscription_id());
        assert_eq!(other.try_recv().unwrap().subscription_id, other.subscription_id());
        assert_ne!(stream.subscription_id(), other.subscription_id());
    }

    #[test]
    fn stream_dropped_mid_broadcast_is_not_counted_as_overflow() {
        let list = QueryList::from(vec!['z']);
        let doomed: Rc<RefCell<Option<ChangeStream>>> = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&doomed);
        let _closer = list.subscribe(move |_| {
            slot.borrow_mut().take();
            Ok(())
        });
        let stream = list.change_stream(&ChangeStreamConfig { capacity: 1 }).unwrap();
        let dropped = Rc::clone(&stream.dropped);
        *doomed.borrow_mut() = Some(stream);

        list.notify_change().unwrap();
        assert!(doomed.borrow().is_none());
        assert_eq!(dropped.get(), 0);
        assert_eq!(list.changes().subscriber_count(), 1);
    }
}
