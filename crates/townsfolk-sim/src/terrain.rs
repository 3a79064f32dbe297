//! Terrain queries consumed by the simulation.
//!
//! Terrain generation lives outside this crate; the simulation only needs
//! to know which tiles block movement, which are forest or restricted,
//! and which named location a point belongs to.

use ahash::AHashSet;
use glam::Vec2;
use townsfolk_common::TileCoord;

/// Default tile edge length in world units.
pub const DEFAULT_TILE_SIZE: f32 = 32.0;
/// Default world edge length in tiles.
pub const DEFAULT_WORLD_TILES: u32 = 256;
/// Location key for open country.
pub const WILDERNESS: &str = "wilderness";
/// Location key for forest tiles outside any settlement.
pub const FOREST: &str = "forest";

/// Read-only view of the world map.
pub trait Terrain {
    /// Tile edge length in world units.
    fn tile_size(&self) -> f32 {
        DEFAULT_TILE_SIZE
    }

    /// World edge length in tiles.
    fn world_tiles(&self) -> u32 {
        DEFAULT_WORLD_TILES
    }

    /// Whether a tile blocks movement.
    fn is_solid(&self, tile: TileCoord) -> bool;

    /// Whether a tile holds a tree trunk.
    fn has_tree(&self, tile: TileCoord) -> bool;

    /// Whether a tile is forest floor (reduces visibility).
    fn is_forest(&self, tile: TileCoord) -> bool;

    /// Whether a tile is off limits to commoners.
    fn is_restricted(&self, tile: TileCoord) -> bool;

    /// Named location containing a world position.
    fn location_at(&self, pos: Vec2) -> String;

    /// Tile containing a world position.
    fn tile_at(&self, pos: Vec2) -> TileCoord {
        TileCoord::from_world(pos, self.tile_size())
    }

    /// Whether movement into a tile is blocked by walls or trees.
    fn blocks_movement(&self, tile: TileCoord) -> bool {
        self.is_solid(tile) || self.has_tree(tile)
    }

    /// Playable area in world units (one tile margin on each side).
    fn bounds(&self) -> (f32, f32) {
        let ts = self.tile_size();
        (ts, self.world_tiles().saturating_sub(1) as f32 * ts)
    }
}

/// Axis-aligned tile rectangle (inclusive bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRect {
    /// Minimum corner
    pub min: TileCoord,
    /// Maximum corner
    pub max: TileCoord,
}

impl TileRect {
    /// Creates a rectangle from inclusive corners.
    #[must_use]
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            min: TileCoord::new(x1, y1),
            max: TileCoord::new(x2, y2),
        }
    }

    /// Whether a tile lies inside.
    #[must_use]
    pub fn contains(&self, tile: TileCoord) -> bool {
        tile.x >= self.min.x && tile.x <= self.max.x && tile.y >= self.min.y && tile.y <= self.max.y
    }
}

/// Area covered by a named location.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionShape {
    /// Rectangle of tiles
    Rect(TileRect),
    /// Tiles closer than `radius` to `center`
    Circle {
        /// Center tile
        center: TileCoord,
        /// Radius in tiles
        radius: f32,
    },
}

impl RegionShape {
    fn contains(&self, tile: TileCoord) -> bool {
        match self {
            Self::Rect(rect) => rect.contains(tile),
            Self::Circle { center, radius } => {
                let dx = (tile.x - center.x) as f32;
                let dy = (tile.y - center.y) as f32;
                (dx * dx + dy * dy).sqrt() < *radius
            },
        }
    }
}

/// Open map with optional walls, trees, forests and named regions.
#[derive(Debug, Clone)]
pub struct FlatTerrain {
    tile_size: f32,
    world_tiles: u32,
    solid: AHashSet<TileCoord>,
    trees: AHashSet<TileCoord>,
    forests: Vec<TileRect>,
    restricted: Vec<TileRect>,
    regions: Vec<(String, RegionShape)>,
}

impl Default for FlatTerrain {
    fn default() -> Self {
        Self::new()
    }
}

impl FlatTerrain {
    /// Creates an empty default-sized map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            world_tiles: DEFAULT_WORLD_TILES,
            solid: AHashSet::new(),
            trees: AHashSet::new(),
            forests: Vec::new(),
            restricted: Vec::new(),
            regions: Vec::new(),
        }
    }

    /// Overrides the map dimensions.
    #[must_use]
    pub fn with_size(mut self, tile_size: f32, world_tiles: u32) -> Self {
        self.tile_size = tile_size.max(1.0);
        self.world_tiles = world_tiles.max(2);
        self
    }

    /// Marks a tile as a wall.
    pub fn block(&mut self, tile: TileCoord) {
        self.solid.insert(tile);
    }

    /// Places a tree on a tile.
    pub fn plant_tree(&mut self, tile: TileCoord) {
        self.trees.insert(tile);
    }

    /// Adds a forest area.
    pub fn add_forest(&mut self, rect: TileRect) {
        self.forests.push(rect);
    }

    /// Adds a restricted area.
    pub fn add_restricted(&mut self, rect: TileRect) {
        self.restricted.push(rect);
    }

    /// Adds a named location. Earlier regions win on overlap.
    pub fn add_region(&mut self, key: impl Into<String>, shape: RegionShape) {
        self.regions.push((key.into(), shape));
    }
}

impl Terrain for FlatTerrain {
    fn tile_size(&self) -> f32 {
        self.tile_size
    }

    fn world_tiles(&self) -> u32 {
        self.world_tiles
    }

    fn is_solid(&self, tile: TileCoord) -> bool {
        let max = self.world_tiles as i32;
        tile.x < 0 || tile.y < 0 || tile.x >= max || tile.y >= max || self.solid.contains(&tile)
    }

    fn has_tree(&self, tile: TileCoord) -> bool {
        self.trees.contains(&tile)
    }

    fn is_forest(&self, tile: TileCoord) -> bool {
        self.forests.iter().any(|rect| rect.contains(tile))
    }

    fn is_restricted(&self, tile: TileCoord) -> bool {
        self.restricted.iter().any(|rect| rect.contains(tile))
    }

    fn location_at(&self, pos: Vec2) -> String {
        let tile = self.tile_at(pos);
        if let Some((key, _)) = self.regions.iter().find(|(_, shape)| shape.contains(tile)) {
            return key.clone();
        }
        if self.is_forest(tile) {
            FOREST.to_string()
        } else {
            WILDERNESS.to_string()
        }
    }
}
