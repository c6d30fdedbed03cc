//! Publish/subscribe primitives for change notification.
//!
//! Observers are plain callbacks registered on an [`EventEmitter`] and invoked
//! synchronously, in subscription order, on every broadcast. Registration hands
//! back an explicit [`Subscription`] handle; pull-style consumers can use a
//! channel-backed [`ChangeStream`] instead.

/// Synchronous broadcast emitter and subscription handles.
pub mod emitter;
/// Change notice and subscription id types.
pub mod notice;
/// Channel-backed change stream.
pub mod stream;

pub use emitter::{EventEmitter, Subscription};
pub use notice::{ChangeNotice, SubscriptionId};
pub use stream::ChangeStream;
