//! Persistence projection of the simulation.
//!
//! Only the mutable per-agent fields are captured; identity, roles and
//! schedules come back from spawning the same population. Byte encoding
//! is a magic header followed by bincode; JSON is offered for tooling.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use townsfolk_common::{AgentId, SchemaVersion, TownsfolkError, SNAPSHOT_MAGIC};

use crate::behavior::StateTag;
use crate::law::CrimeRecord;
use crate::memory::MemoryEvent;

/// Errors raised while encoding or decoding snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Missing or wrong magic header
    #[error("Invalid snapshot format")]
    InvalidFormat,

    /// Written by a newer, incompatible version
    #[error("Incompatible snapshot version: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build writes
        expected: SchemaVersion,
        /// Version found in the data
        found: SchemaVersion,
    },

    /// Payload could not be decoded
    #[error("Corrupted snapshot: {0}")]
    Corrupted(String),

    /// Snapshot could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<SnapshotError> for TownsfolkError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::VersionMismatch { expected, found } => Self::VersionMismatch {
                expected: expected.to_string(),
                actual: found.to_string(),
            },
            other => Self::Serialization(other.to_string()),
        }
    }
}

/// Result alias for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Saved state of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Registry id
    pub id: AgentId,
    /// Position
    pub position: Vec2,
    /// Health
    pub health: f32,
    /// Whether the agent is alive
    pub alive: bool,
    /// Behavior state tag
    pub state: StateTag,
    /// Opinion of the player
    pub player_relation: i32,
    /// Memories, oldest first
    pub memory: Vec<MemoryEvent>,
    /// Bleeding rate
    pub bleeding: f32,
}

/// Saved state of a whole world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Format version
    pub version: SchemaVersion,
    /// Game minute of day
    pub minutes: f32,
    /// Day counter
    pub day: u32,
    /// Per-agent records in registry order
    pub agents: Vec<AgentRecord>,
    /// Recent crimes, oldest first
    pub recent_crimes: Vec<CrimeRecord>,
}

impl WorldSnapshot {
    /// Encodes to the binary snapshot format.
    pub fn to_bytes(&self) -> SnapshotResult<Vec<u8>> {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&SNAPSHOT_MAGIC);

        let data =
            bincode::serialize(self).map_err(|e| SnapshotError::Serialization(e.to_string()))?;
        buffer.extend(data);

        Ok(buffer)
    }

    /// Decodes the binary snapshot format.
    pub fn from_bytes(bytes: &[u8]) -> SnapshotResult<Self> {
        if bytes.len() < 4 || bytes[0..4] != SNAPSHOT_MAGIC {
            return Err(SnapshotError::InvalidFormat);
        }

        let snapshot: Self =
            bincode::deserialize(&bytes[4..]).map_err(|e| SnapshotError::Corrupted(e.to_string()))?;

        snapshot.check_version()?;
        Ok(snapshot)
    }

    /// Encodes as pretty JSON.
    pub fn to_json(&self) -> SnapshotResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes JSON.
    pub fn from_json(source: &str) -> SnapshotResult<Self> {
        let snapshot: Self = serde_json::from_str(source)?;
        snapshot.check_version()?;
        Ok(snapshot)
    }

    fn check_version(&self) -> SnapshotResult<()> {
        if SchemaVersion::WORLD_SNAPSHOT.can_read(&self.version) {
            Ok(())
        } else {
            Err(SnapshotError::VersionMismatch {
                expected: SchemaVersion::WORLD_SNAPSHOT,
                found: self.version,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::law::CrimeKind;
    use crate::memory::MemoryKind;

    fn sample() -> WorldSnapshot {
        WorldSnapshot {
            version: SchemaVersion::WORLD_SNAPSHOT,
            minutes: 615.5,
            day: 3,
            agents: vec![AgentRecord {
                id: AgentId::from_index(0),
                position: Vec2::new(10.0, 20.0),
                health: 42.0,
                alive: true,
                state: StateTag::Fight,
                player_relation: -25,
                memory: vec![MemoryEvent {
                    kind: MemoryKind::WitnessedCrime {
                        crime: CrimeKind::Theft,
                    },
                    time: 600.0,
                }],
                bleeding: 1.5,
            }],
            recent_crimes: Vec::new(),
        }
    }

    #[test]
    fn test_bytes_round_trip() {
        let snapshot = sample();
        let bytes = snapshot.to_bytes().expect("encode");
        assert_eq!(&bytes[0..4], b"TFSV");
        let decoded = WorldSnapshot::from_bytes(&bytes).expect("decode");
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_json_round_trip() {
        let snapshot = sample();
        let json = snapshot.to_json().expect("encode");
        assert_eq!(WorldSnapshot::from_json(&json).expect("decode"), snapshot);
    }

    #[test]
    fn test_bad_magic() {
        assert!(matches!(
            WorldSnapshot::from_bytes(b"NOPE1234"),
            Err(SnapshotError::InvalidFormat)
        ));
        assert!(matches!(
            WorldSnapshot::from_bytes(b"TF"),
            Err(SnapshotError::InvalidFormat)
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let bytes = sample().to_bytes().expect("encode");
        assert!(matches!(
            WorldSnapshot::from_bytes(&bytes[..bytes.len() / 2]),
            Err(SnapshotError::Corrupted(_))
        ));
    }

    #[test]
    fn test_newer_major_rejected() {
        let mut snapshot = sample();
        snapshot.version = SchemaVersion::new(2, 0);
        let bytes = snapshot.to_bytes().expect("encode");
        assert!(matches!(
            WorldSnapshot::from_bytes(&bytes),
            Err(SnapshotError::VersionMismatch { .. })
        ));
    }
}
