//! Error types for querylist.
//!
//! All errors in querylist are strongly typed using thiserror.
//! Observer failures are carried unmodified from the observer that raised
//! them to the caller that triggered the broadcast.

use thiserror::Error;

use crate::event::SubscriptionId;

/// Error raised by an observer while handling a broadcast.
///
/// The first observer error aborts the remaining observers of that broadcast
/// and is returned as-is from `EventEmitter::emit` / `QueryList::notify_change`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ObserverError {
    message: String,
}

impl ObserverError {
    /// Creates an observer error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message supplied by the observer.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Configuration errors detected while loading or validating config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Field '{field}' must be non-zero")]
    ZeroValue {
        field: String,
    },

    #[error("Field '{field}' cannot be empty")]
    EmptyField {
        field: String,
    },

    #[error("Failed to parse config: {message}")]
    Parse {
        message: String,
    },

    #[error("No provider configured for capability '{capability}'")]
    MissingProvider {
        capability: &'static str,
    },
}

/// Errors raised by capability providers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("No default document is available: {reason}")]
    DocumentUnavailable {
        reason: String,
    },

    #[error("Location history has no entry to move {direction}")]
    HistoryExhausted {
        direction: &'static str,
    },

    #[error("Platform initializer '{name}' failed: {reason}")]
    InitializerFailed {
        name: String,
        reason: String,
    },
}

/// Errors from pull-style change streams.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("Change stream {subscription_id} is disconnected")]
    Disconnected {
        subscription_id: SubscriptionId,
    },

    #[error("Timed out after {duration_ms}ms waiting for a change notice")]
    Timeout {
        duration_ms: u64,
    },

    #[error("No change notice is queued")]
    Empty,
}

/// Top-level error type for querylist.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Observer error: {0}")]
    Observer(#[from] ObserverError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl QueryError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is an observer error.
    #[must_use]
    pub const fn is_observer(&self) -> bool {
        matches!(self, Self::Observer(_))
    }

    /// Returns true if this is a config error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is a provider error.
    #[must_use]
    pub const fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_))
    }

    /// Returns true if this is a stream error.
    #[must_use]
    pub const fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Returns true if waiting again may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Stream(StreamError::Timeout { .. } | StreamError::Empty)
        )
    }
}

/// Result type alias for querylist operations.
pub type QueryResult<T> = Result<T, QueryError>;
