//! Pool configuration.
//!
//! A pool is configured with the number of connections it keeps open and an
//! optional default bound on how long [`acquire`] waits. Configuration can be
//! built in code or loaded from TOML:
//!
//! ```toml
//! max_connections = 10
//! acquire_timeout_ms = 2500
//! ```
//!
//! [`acquire`]: https://docs.rs/reservoir_pool/latest/reservoir_pool/struct.Pool.html#method.acquire

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of connections held by a pool.
pub const DEFAULT_MAX_CONNECTIONS: usize = 10;

/// Configuration for a connection pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Number of connections opened at construction. Fixed for the pool's lifetime.
    pub max_connections: usize,

    /// Default bound for `acquire`. `None` waits indefinitely.
    #[serde(
        rename = "acquire_timeout_ms",
        with = "duration_ms",
        skip_serializing_if = "Option::is_none"
    )]
    pub acquire_timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: None,
        }
    }
}

impl PoolConfig {
    /// Configuration for a pool of `max_connections` with unbounded acquisition.
    pub fn new(max_connections: usize) -> Self {
        Self {
            max_connections,
            acquire_timeout: None,
        }
    }

    /// Set the default acquire bound.
    pub fn with_acquire_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.acquire_timeout = timeout.into();
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Check that the configuration describes a usable pool.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.acquire_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid(
                "acquire_timeout_ms must be greater than zero; omit it to wait indefinitely"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Stores an optional duration as whole milliseconds.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => serializer.serialize_u64(duration.as_millis() as u64),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
