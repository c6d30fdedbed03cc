//! # querylist - Observable query result lists
//!
//! A `QueryList` is the live result of a query over framework-managed
//! elements: an ordered, read-only (to consumers) list that its owner replaces
//! wholesale whenever the set of matches changes, and that tells interested
//! observers when it has done so.
//!
//! ## Core Concepts
//!
//! - **QueryList**: Ordered result list with derived views and change notification
//! - **EventEmitter / Subscription**: Synchronous, ordered publish/subscribe with explicit handles
//! - **ChangeStream**: Bounded, pull-style feed of change notices
//! - **Providers**: Capability traits bound to real or mock implementations at composition time
//!
//! ## Usage
//!
//! ```rust
//! use querylist::{ChangeStreamConfig, QueryList};
//!
//! let mut matches: QueryList<u32> = QueryList::new();
//! let stream = matches.change_stream(&ChangeStreamConfig::default()).unwrap();
//!
//! matches.reset(vec![3, 1, 2]);
//! matches.notify_change().unwrap();
//!
//! let notice = stream.try_recv().unwrap();
//! assert_eq!(notice.len, 3);
//! assert_eq!(matches.reduce(|acc, v| acc + *v, 0u32), 6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod event;
pub mod providers;
pub mod query_list;

// Re-export primary types at crate root for convenience
pub use config::{ApplicationConfig, ChangeStreamConfig};
pub use error::{
	ConfigError, ObserverError, ProviderError, QueryError, QueryResult, StreamError,
};
pub use event::{ChangeNotice, ChangeStream, EventEmitter, Subscription, SubscriptionId};
pub use providers::{ApplicationProviders, PlatformProviders};
pub use query_list::QueryList;
