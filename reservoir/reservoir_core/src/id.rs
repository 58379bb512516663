//! Identifiers for pools and the connections they own.
//!
//! A [`PoolId`] is a random UUID assigned when a pool is constructed and is
//! used to tell pools apart, for instance when a connection is handed back
//! to a pool that did not create it. A [`ConnectionId`] is the position of a
//! connection in its pool's construction order; it is only unique within
//! one pool.
//!
//! # Examples
//!
//! ```
//! use reservoir_core::id::{ConnectionId, PoolId};
//! use std::str::FromStr;
//!
//! let pool_id = PoolId::new();
//! assert_ne!(pool_id, PoolId::new());
//!
//! let id_str = "550e8400-e29b-41d4-a716-446655440000";
//! let pool_id = PoolId::from_str(id_str).unwrap();
//! assert_eq!(pool_id.to_string(), id_str);
//!
//! assert_eq!(ConnectionId::new(3).to_string(), "conn-3");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier for a pool instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PoolId {
    uuid: Uuid,
}

impl PoolId {
    /// Create a new random identifier.
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
        }
    }

    /// Create an identifier from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self { uuid }
    }

    /// Get the underlying UUID.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }
}

impl Default for PoolId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uuid)
    }
}

impl FromStr for PoolId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            uuid: Uuid::parse_str(s)?,
        })
    }
}

/// Identifier for a connection within its pool.
///
/// The id is fixed when the pool opens the connection and stays the same
/// for as long as the connection circulates between callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Create an identifier for the connection opened at position `index`.
    pub fn new(index: u64) -> Self {
        Self(index)
    }

    /// The construction-order index of this connection.
    pub fn index(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_id_new() {
        let id1 = PoolId::new();
        let id2 = PoolId::new();
        assert_ne!(id1, id2, "Generated IDs should be unique");
    }

    #[test]
    fn test_pool_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = PoolId::from_uuid(uuid);
        assert_eq!(id.uuid(), uuid);
    }

    #[test]
    fn test_pool_id_rejects_garbage() {
        assert!(PoolId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn test_connection_id_ordering() {
        assert!(ConnectionId::new(1) < ConnectionId::new(2));
        assert_eq!(ConnectionId::new(7).index(), 7);
    }
}
