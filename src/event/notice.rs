//! Identifier and notice types for change subscriptions.
//!
//! These types are serializable so notices can be logged or forwarded as-is.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Create a new random subscription id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Summary of a single change broadcast, as delivered to a `ChangeStream`.
///
/// Notices carry no diff. Consumers that need the items re-read the list.
#[allow(missing_docs)]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeNotice {
    pub notice_id: Uuid,
    /// The stream subscription this notice was delivered to.
    pub subscription_id: SubscriptionId,
    /// Number of resets the list had applied when the broadcast happened.
    pub version: u64,
    /// Item count at broadcast time.
    pub len: usize,
    pub timestamp: DateTime<Utc>,
}

impl ChangeNotice {
    /// Stamp a notice for the given list state.
    #[must_use]
    pub fn new(subscription_id: SubscriptionId, version: u64, len: usize) -> Self {
        Self {
            notice_id: Uuid::new_v4(),
            subscription_id,
            version,
            len,
            timestamp: Utc::now(),
        }
    }
}
