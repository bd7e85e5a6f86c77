//! Tile map built from a source bitmap
//!
//! The map is constructed once by sampling the bitmap at tile-aligned points
//! and classifying each sample by exact color match against the reserved
//! floor and start colors. After construction it is immutable and shared
//! read-only by every episode.

pub mod builtin;

use std::path::Path;

use fxhash::{FxHashMap, FxHashSet};
use image::RgbImage;
use log::{debug, info};

use crate::config::MapSpec;
use crate::error::MapError;

// ============================================================================
// GridPos
// ============================================================================

/// Tile-aligned position in map units (top-left corner of the tile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position, in map units.
    pub fn distance_to(&self, other: GridPos) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Position shifted by a displacement vector.
    pub fn offset(&self, dx: i32, dy: i32) -> GridPos {
        GridPos::new(self.x + dx, self.y + dy)
    }
}

// ============================================================================
// TileKind
// ============================================================================

/// Classification of one sampled map point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TileKind {
    /// Walkable floor
    Floor,
    /// Robot spawn tile, also walkable
    Start,
    /// Everything else: walls, rubble, void
    Obstacle,
}

impl TileKind {
    pub fn is_traversable(self) -> bool {
        matches!(self, TileKind::Floor | TileKind::Start)
    }
}

// ============================================================================
// TileMap
// ============================================================================

/// Immutable tile classification of the rescue site.
///
/// Holds the traversable set in deterministic scan order (x-outer, y-inner)
/// so that placement draws are reproducible for a fixed seed.
#[derive(Debug, Clone)]
pub struct TileMap {
    spec: MapSpec,
    tiles: FxHashMap<GridPos, TileKind>,
    traversable: Vec<GridPos>,
    walkable: FxHashSet<GridPos>,
    start: GridPos,
}

impl TileMap {
    /// Build the map by scanning `img` at every tile-aligned point.
    ///
    /// The first sampled point matching the start color becomes the spawn
    /// tile. Fails with `MapError::StartTileMissing` when no such point
    /// exists and with `MapError::BitmapTooSmall` when the bitmap does not
    /// cover the configured map area.
    pub fn from_image(img: &RgbImage, spec: &MapSpec) -> Result<Self, MapError> {
        if img.width() < spec.width || img.height() < spec.height {
            return Err(MapError::BitmapTooSmall {
                found_w: img.width(),
                found_h: img.height(),
                want_w: spec.width,
                want_h: spec.height,
            });
        }

        let mut tiles = FxHashMap::default();
        let mut traversable = Vec::new();
        let mut walkable = FxHashSet::default();
        let mut start = None;

        let stride = spec.tile_size as usize;
        for x in (0..spec.width).step_by(stride) {
            for y in (0..spec.height).step_by(stride) {
                let px = img.get_pixel(x, y).0;
                let kind = if px == spec.floor_color {
                    TileKind::Floor
                } else if px == spec.start_color {
                    TileKind::Start
                } else {
                    TileKind::Obstacle
                };

                let pos = GridPos::new(x as i32, y as i32);
                tiles.insert(pos, kind);
                if kind.is_traversable() {
                    traversable.push(pos);
                    walkable.insert(pos);
                }
                if kind == TileKind::Start && start.is_none() {
                    start = Some(pos);
                }
            }
        }

        let start = start.ok_or(MapError::StartTileMissing)?;
        info!(
            "tile map ready: {} traversable tiles, spawn at ({}, {})",
            traversable.len(),
            start.x,
            start.y
        );
        debug!("map grid {}x{} tiles", spec.width / spec.tile_size, spec.height / spec.tile_size);

        Ok(Self {
            spec: *spec,
            tiles,
            traversable,
            walkable,
            start,
        })
    }

    /// Load and decode a bitmap file, then build the map from it.
    pub fn from_path<P: AsRef<Path>>(path: P, spec: &MapSpec) -> Result<Self, MapError> {
        let img = image::open(path)?.to_rgb8();
        Self::from_image(&img, spec)
    }

    /// Classification of the tile whose top-left corner is `(x, y)`.
    ///
    /// Unsampled or out-of-bounds coordinates classify as `Obstacle`.
    pub fn classify(&self, x: i32, y: i32) -> TileKind {
        self.tiles
            .get(&GridPos::new(x, y))
            .copied()
            .unwrap_or(TileKind::Obstacle)
    }

    /// All walkable tiles (floor plus start) in bitmap scan order.
    pub fn traversable_positions(&self) -> &[GridPos] {
        &self.traversable
    }

    /// Whether the robot (or a target) may occupy `pos`.
    pub fn is_traversable(&self, pos: GridPos) -> bool {
        self.walkable.contains(&pos)
    }

    /// The robot spawn tile.
    pub fn start_position(&self) -> GridPos {
        self.start
    }

    pub fn spec(&self) -> &MapSpec {
        &self.spec
    }

    pub fn width(&self) -> u32 {
        self.spec.width
    }

    pub fn height(&self) -> u32 {
        self.spec.height
    }

    pub fn tile_size(&self) -> u32 {
        self.spec.tile_size
    }
}

// ============================================================================
// Tests
// ============================================================================
