//! Sprite assets
//!
//! The robot and each target are drawn from small PNG sprites. A reserved
//! colorkey (black, as authored) marks transparent pixels; sprites are
//! rescaled to the tile size at load time. Missing or undecodable files are
//! fatal setup errors.

use std::path::Path;

use image::{imageops, Rgba, RgbaImage};
use log::debug;

use crate::error::AssetError;

/// Colorkey used by the shipped sprite set.
pub const DEFAULT_COLORKEY: [u8; 3] = [0, 0, 0];

// ============================================================================
// Sprite
// ============================================================================

/// One tile-sized RGBA sprite, colorkey already applied.
#[derive(Debug, Clone)]
pub struct Sprite {
    image: RgbaImage,
}

impl Sprite {
    /// Build a sprite from a decoded image: apply the colorkey, then rescale
    /// to `tile_size` square with nearest-neighbor sampling.
    pub fn from_image(src: &RgbaImage, colorkey: Option<[u8; 3]>, tile_size: u32) -> Self {
        let mut keyed = src.clone();
        if let Some(key) = colorkey {
            for px in keyed.pixels_mut() {
                if [px.0[0], px.0[1], px.0[2]] == key {
                    px.0[3] = 0;
                }
            }
        }
        let image = if keyed.dimensions() == (tile_size, tile_size) {
            keyed
        } else {
            imageops::resize(&keyed, tile_size, tile_size, imageops::FilterType::Nearest)
        };
        Self { image }
    }

    /// Decode a PNG file into a sprite.
    pub fn load<P: AsRef<Path>>(
        path: P,
        colorkey: Option<[u8; 3]>,
        tile_size: u32,
    ) -> Result<Self, AssetError> {
        let img = image::open(path.as_ref())?.to_rgba8();
        debug!("loaded sprite {:?} ({}x{})", path.as_ref(), img.width(), img.height());
        Ok(Self::from_image(&img, colorkey, tile_size))
    }

    /// Flat-color marker sprite used when no asset files are configured.
    pub fn flat(color: [u8; 3], tile_size: u32) -> Self {
        let image = RgbaImage::from_pixel(
            tile_size,
            tile_size,
            Rgba([color[0], color[1], color[2], 255]),
        );
        Self { image }
    }

    pub fn size(&self) -> u32 {
        self.image.width()
    }

    /// Pixel at sprite-local coordinates; alpha 0 means skip on blit.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }
}

// ============================================================================
// SpriteSet
// ============================================================================

/// The full sprite complement: one robot, one sprite per target index.
#[derive(Debug, Clone)]
pub struct SpriteSet {
    pub robot: Sprite,
    pub targets: Vec<Sprite>,
}

impl SpriteSet {
    /// Load robot and target sprites from files, colorkeyed and tile-scaled.
    pub fn load<P: AsRef<Path>>(
        robot_path: P,
        target_paths: &[P],
        colorkey: Option<[u8; 3]>,
        tile_size: u32,
    ) -> Result<Self, AssetError> {
        let robot = Sprite::load(&robot_path, colorkey, tile_size)?;
        let targets = target_paths
            .iter()
            .map(|p| Sprite::load(p, colorkey, tile_size))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { robot, targets })
    }

    /// Procedural marker set: white robot, distinct warm colors per target.
    pub fn flat(target_count: usize, tile_size: u32) -> Self {
        const TARGET_COLORS: [[u8; 3]; 3] = [[230, 126, 34], [46, 204, 113], [155, 89, 182]];
        let robot = Sprite::flat([236, 240, 241], tile_size);
        let targets = (0..target_count)
            .map(|i| Sprite::flat(TARGET_COLORS[i % TARGET_COLORS.len()], tile_size))
            .collect();
        Self { robot, targets }
    }

    /// Sprite for target `index`, cycling when more targets than sprites are
    /// configured.
    pub fn target(&self, index: usize) -> &Sprite {
        &self.targets[index % self.targets.len()]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorkey_clears_alpha() {
        let mut src = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        src.put_pixel(0, 0, Rgba([0, 0, 0, 255]));

        let sprite = Sprite::from_image(&src, Some(DEFAULT_COLORKEY), 4);
        assert_eq!(sprite.pixel(0, 0)[3], 0);
        assert_eq!(sprite.pixel(1, 1)[3], 255);
    }

    #[test]
    fn test_rescales_to_tile_size() {
        let src = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        let sprite = Sprite::from_image(&src, None, 20);
        assert_eq!(sprite.size(), 20);
    }

    #[test]
    fn test_flat_set_has_one_sprite_per_target() {
        let set = SpriteSet::flat(3, 20);
        assert_eq!(set.targets.len(), 3);
        assert_eq!(set.robot.size(), 20);
        // cycling past the configured count stays in range
        let _ = set.target(7);
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        // image::open folds the underlying IO failure into its decode error
        let err = Sprite::load("/nonexistent/robot.png", None, 20);
        assert!(matches!(err, Err(AssetError::Decode(_))));
    }

    #[test]
    fn test_load_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("robot.png");
        let src = RgbaImage::from_pixel(20, 20, Rgba([10, 20, 30, 255]));
        src.save(&path).unwrap();

        let sprite = Sprite::load(&path, Some(DEFAULT_COLORKEY), 20).unwrap();
        assert_eq!(sprite.size(), 20);
        assert_eq!(sprite.pixel(5, 5), [10, 20, 30, 255]);
    }
}
