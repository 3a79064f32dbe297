//! ID types for agents.

use serde::{Deserialize, Serialize};

/// Stable identifier of an agent in a simulation registry.
///
/// Ids are assigned by the registry in spawn order and double as the
/// agent's index, so they stay valid for the lifetime of the world
/// (agents are never removed, only killed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates an agent ID from a raw value (for deserialization).
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Creates an agent ID for a registry slot.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns the registry slot this ID refers to.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}
