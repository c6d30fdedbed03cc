//! Configuration for change streams and application providers.
//!
//! Both structs deserialize from JSON with every field optional; missing
//! fields fall back to `Default`.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, QueryResult};

/// Default buffer size for a `ChangeStream`.
pub const DEFAULT_STREAM_CAPACITY: usize = 1024;

/// Application id used when none is configured.
pub const DEFAULT_APP_ID: &str = "a";

/// Base href used when none is configured.
pub const DEFAULT_BASE_HREF: &str = "/";

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeStreamConfig {
    /// Max buffered notices before new ones are dropped.
    pub capacity: usize,
}

impl Default for ChangeStreamConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_STREAM_CAPACITY,
        }
    }
}

impl ChangeStreamConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> QueryResult<Self> {
        let cfg: Self = parse_json(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configs that cannot produce a working stream.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroValue {
                field: "capacity".to_string(),
            });
        }
        Ok(())
    }
}

/// Settings consumed by `ApplicationProviders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Application id bound for the application's lifetime.
    pub app_id: String,
    /// Base href reported by location strategies.
    pub base_href: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.to_string(),
            base_href: DEFAULT_BASE_HREF.to_string(),
        }
    }
}

impl ApplicationConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> QueryResult<Self> {
        let cfg: Self = parse_json(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// `app_id` must contain at least one non-whitespace character.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.trim().is_empty() {
            return Err(ConfigError::EmptyField {
                field: "app_id".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_json<T: for<'de> Deserialize<'de>>(json: &str) -> Result<T, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Parse {
        message: e.to_string(),
    })
}
