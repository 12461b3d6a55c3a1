//! Strongly-typed identifiers for agents and breeds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies an agent within its base agent set.
///
/// Ids are assigned by the base set at creation time, strictly
/// increasing, and never reused. Patches, turtles and links each have
/// their own id space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    /// The id as a `usize`, for indexing dense per-agent tables.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a breed registered with a base agent set.
///
/// `BreedId(n)` is the n-th breed registered with that set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BreedId(pub u16);

impl BreedId {
    /// The id as a `usize` registry index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BreedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for BreedId {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_ids_order_by_value() {
        assert!(AgentId(3) < AgentId(10));
        assert_eq!(AgentId::from(7).index(), 7);
        assert_eq!(AgentId(42).to_string(), "42");
    }

    #[test]
    fn breed_id_index() {
        assert_eq!(BreedId(2).index(), 2);
        assert_eq!(BreedId::from(5u16), BreedId(5));
    }
}
