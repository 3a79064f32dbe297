//! Tile coordinates for terrain lookups.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Tile coordinate in the terrain grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts a world position (in world units) to the tile containing it.
    #[must_use]
    pub fn from_world(pos: Vec2, tile_size: f32) -> Self {
        let size = tile_size.max(1.0);
        Self {
            x: (pos.x / size).floor() as i32,
            y: (pos.y / size).floor() as i32,
        }
    }

    /// Returns the world position of this tile's top-left corner.
    #[must_use]
    pub fn origin(self, tile_size: f32) -> Vec2 {
        Vec2::new(self.x as f32 * tile_size, self.y as f32 * tile_size)
    }

    /// Returns the world position of this tile's center.
    #[must_use]
    pub fn center(self, tile_size: f32) -> Vec2 {
        self.origin(tile_size) + Vec2::splat(tile_size * 0.5)
    }
}
