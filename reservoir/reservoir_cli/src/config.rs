//! Benchmark configuration.
//!
//! Loaded from TOML; every field is optional:
//!
//! ```toml
//! tasks = 1000
//! query_ms = 10
//! connect_ms = 5
//!
//! [pool]
//! max_connections = 10
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use reservoir_core::{ConfigError, PoolConfig};
use serde::{Deserialize, Serialize};

/// Workload description for the benchmark commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// Number of concurrent tasks, each running one statement
    pub tasks: usize,

    /// Time each statement takes, in milliseconds
    pub query_ms: u64,

    /// Time opening a connection takes, in milliseconds
    pub connect_ms: u64,

    /// Pool under test
    pub pool: PoolConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            tasks: 1000,
            query_ms: 10,
            connect_ms: 5,
            pool: PoolConfig::default(),
        }
    }
}

impl BenchConfig {
    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the workload can run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tasks == 0 {
            return Err(ConfigError::Invalid("tasks must be at least 1".to_string()));
        }
        self.pool.validate()
    }

    /// Delay per statement
    pub fn query_delay(&self) -> Duration {
        Duration::from_millis(self.query_ms)
    }

    /// Delay per connection open
    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }
}
