//! Tunable consistency levels
//!
//! Levels are opaque to the mapping layer: they are carried on every read,
//! write, query and delete and forwarded verbatim to the backing store.
//! `None` wherever an `Option<ConsistencyLevel>` appears means "use the
//! store's default".

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of replicas that must acknowledge an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsistencyLevel {
    /// Any node, including hinted handoff
    Any,
    /// One replica
    One,
    /// Two replicas
    Two,
    /// Three replicas
    Three,
    /// Majority of replicas
    Quorum,
    /// All replicas
    All,
    /// Majority of replicas in the local datacenter
    LocalQuorum,
    /// Majority of replicas in each datacenter
    EachQuorum,
    /// Linearizable (lightweight transaction)
    Serial,
    /// Linearizable within the local datacenter
    LocalSerial,
}

impl ConsistencyLevel {
    /// All levels, in declaration order
    pub const ALL: [ConsistencyLevel; 10] = [
        ConsistencyLevel::Any,
        ConsistencyLevel::One,
        ConsistencyLevel::Two,
        ConsistencyLevel::Three,
        ConsistencyLevel::Quorum,
        ConsistencyLevel::All,
        ConsistencyLevel::LocalQuorum,
        ConsistencyLevel::EachQuorum,
        ConsistencyLevel::Serial,
        ConsistencyLevel::LocalSerial,
    ];

    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyLevel::Any => "ANY",
            ConsistencyLevel::One => "ONE",
            ConsistencyLevel::Two => "TWO",
            ConsistencyLevel::Three => "THREE",
            ConsistencyLevel::Quorum => "QUORUM",
            ConsistencyLevel::All => "ALL",
            ConsistencyLevel::LocalQuorum => "LOCAL_QUORUM",
            ConsistencyLevel::EachQuorum => "EACH_QUORUM",
            ConsistencyLevel::Serial => "SERIAL",
            ConsistencyLevel::LocalSerial => "LOCAL_SERIAL",
        }
    }

    /// Check if this is one of the linearizable levels
    pub fn is_serial(&self) -> bool {
        matches!(self, ConsistencyLevel::Serial | ConsistencyLevel::LocalSerial)
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsistencyLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        ConsistencyLevel::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == upper)
            .ok_or_else(|| {
                Error::invalid_argument(format!("unknown consistency level '{}'", s))
            })
    }
}
