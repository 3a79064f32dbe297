//! # Townsfolk Common
//!
//! Shared types used across the Townsfolk crates:
//! - Agent identifiers
//! - Tile coordinates for terrain lookups
//! - Format versions and the snapshot magic
//! - Top-level error type
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::version::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_tile_coord_from_world() {
        let tile = TileCoord::from_world(Vec2::new(100.0, 200.0), 32.0);
        assert_eq!(tile, TileCoord::new(3, 6));
        assert_eq!(tile.center(32.0), Vec2::new(112.0, 208.0));
    }

    #[test]
    fn test_agent_id_roundtrip() {
        let id = AgentId::from_index(7);
        assert_eq!(id.index(), 7);
        assert_eq!(id.raw(), 7);
    }

    #[test]
    fn test_version_reads_same_major() {
        let reader = SchemaVersion::new(1, 0);
        assert!(reader.can_read(&SchemaVersion::new(1, 3)));
        assert!(!reader.can_read(&SchemaVersion::new(2, 0)));
        assert_eq!(SchemaVersion::new(1, 2).to_string(), "v1.2");
    }
}
