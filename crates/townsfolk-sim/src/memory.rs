//! Agent memories.

use serde::{Deserialize, Serialize};

use crate::law::CrimeKind;
use crate::ring::BoundedLog;

/// Memories kept per agent before the oldest is forgotten.
pub const DEFAULT_MEMORY_CAPACITY: usize = 10;

/// What an agent remembers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryKind {
    /// Saw the player commit a crime
    WitnessedCrime {
        /// Kind of crime
        crime: CrimeKind,
    },
    /// Was told about a crime by a witness
    CrimeReport {
        /// Kind of crime
        crime: CrimeKind,
    },
    /// Free-form note supplied by a collaborator
    Note(String),
}

/// A timestamped memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEvent {
    /// What happened
    pub kind: MemoryKind,
    /// Game minute it happened at
    pub time: f32,
}

/// Bounded memory log (oldest evicted first).
pub type MemoryLog = BoundedLog<MemoryEvent>;
