//! Built-in rescue site bitmap
//!
//! A procedurally painted map in the reserved colors so that rollouts and
//! tests run without any asset files on disk. Layout: four rooms joined by
//! corridors, spawn tile in the north-west room.

use image::{Rgb, RgbImage};
use once_cell::sync::Lazy;

use crate::config::MapSpec;

/// Background color of non-walkable area in the demo bitmap.
const WALL_COLOR: [u8; 3] = [12, 12, 16];

static DEMO_MAP: Lazy<RgbImage> = Lazy::new(|| paint_demo_map(&MapSpec::default()));

/// The demo bitmap for the default `MapSpec` geometry.
pub fn demo_map() -> &'static RgbImage {
    &DEMO_MAP
}

/// Fill one tile of `img` with a flat color.
///
/// `tx`/`ty` are tile indices, not map units. Painting whole tiles keeps the
/// sampled top-left corner representative of the tile.
pub fn paint_tile(img: &mut RgbImage, spec: &MapSpec, tx: u32, ty: u32, color: [u8; 3]) {
    let ts = spec.tile_size;
    for dx in 0..ts {
        for dy in 0..ts {
            let x = tx * ts + dx;
            let y = ty * ts + dy;
            if x < img.width() && y < img.height() {
                img.put_pixel(x, y, Rgb(color));
            }
        }
    }
}

/// Fill a rectangle of tiles, `(tx, ty)` inclusive to exclusive extents.
fn paint_rect(img: &mut RgbImage, spec: &MapSpec, tx0: u32, ty0: u32, tx1: u32, ty1: u32, color: [u8; 3]) {
    for tx in tx0..tx1 {
        for ty in ty0..ty1 {
            paint_tile(img, spec, tx, ty, color);
        }
    }
}

/// Paint the demo layout for an arbitrary spec geometry.
pub fn paint_demo_map(spec: &MapSpec) -> RgbImage {
    let mut img = RgbImage::from_pixel(spec.width, spec.height, Rgb(WALL_COLOR));
    let tiles_x = spec.width / spec.tile_size;
    let tiles_y = spec.height / spec.tile_size;
    let mid_x = tiles_x / 2;
    let mid_y = tiles_y / 2;

    // Four rooms, one tile of wall kept around the border
    paint_rect(&mut img, spec, 1, 1, mid_x - 1, mid_y - 1, spec.floor_color);
    paint_rect(&mut img, spec, mid_x + 1, 1, tiles_x - 1, mid_y - 1, spec.floor_color);
    paint_rect(&mut img, spec, 1, mid_y + 1, mid_x - 1, tiles_y - 1, spec.floor_color);
    paint_rect(&mut img, spec, mid_x + 1, mid_y + 1, tiles_x - 1, tiles_y - 1, spec.floor_color);

    // Corridors joining the rooms through the dividing walls
    paint_rect(&mut img, spec, mid_x - 1, mid_y / 2, mid_x + 1, mid_y / 2 + 1, spec.floor_color);
    paint_rect(
        &mut img,
        spec,
        mid_x - 1,
        mid_y + mid_y / 2,
        mid_x + 1,
        mid_y + mid_y / 2 + 1,
        spec.floor_color,
    );
    paint_rect(&mut img, spec, mid_x / 2, mid_y - 1, mid_x / 2 + 1, mid_y + 1, spec.floor_color);
    paint_rect(
        &mut img,
        spec,
        mid_x + mid_x / 2,
        mid_y - 1,
        mid_x + mid_x / 2 + 1,
        mid_y + 1,
        spec.floor_color,
    );

    // Spawn tile in the north-west room
    paint_tile(&mut img, spec, 2, 2, spec.start_color);

    img
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{TileKind, TileMap};

    #[test]
    fn test_demo_map_builds() {
        let spec = MapSpec::default();
        let map = TileMap::from_image(demo_map(), &spec).unwrap();

        assert_eq!(map.start_position().x, 40);
        assert_eq!(map.start_position().y, 40);
        // enough room for placements well beyond the default target count
        assert!(map.traversable_positions().len() > 100);
    }

    #[test]
    fn test_demo_map_border_is_walled() {
        let spec = MapSpec::default();
        let map = TileMap::from_image(demo_map(), &spec).unwrap();

        for tx in 0..spec.width / spec.tile_size {
            let x = (tx * spec.tile_size) as i32;
            assert_eq!(map.classify(x, 0), TileKind::Obstacle);
            assert_eq!(
                map.classify(x, (spec.height - spec.tile_size) as i32),
                TileKind::Obstacle
            );
        }
    }

    #[test]
    fn test_rooms_are_connected_to_spawn() {
        let spec = MapSpec::default();
        let map = TileMap::from_image(demo_map(), &spec).unwrap();
        let ts = spec.tile_size as i32;

        // flood fill over the traversable set from the spawn tile
        let mut seen = std::collections::HashSet::new();
        let mut queue = vec![map.start_position()];
        while let Some(pos) = queue.pop() {
            if !seen.insert(pos) {
                continue;
            }
            for (dx, dy) in [(0, -ts), (ts, 0), (0, ts), (-ts, 0)] {
                let next = pos.offset(dx, dy);
                if map.is_traversable(next) && !seen.contains(&next) {
                    queue.push(next);
                }
            }
        }

        assert_eq!(seen.len(), map.traversable_positions().len());
    }
}
