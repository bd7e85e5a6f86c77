//! Visual observation
//!
//! Render pipeline per step: crop a square viewport of the map around the
//! robot (clamped to the map edges), composite the robot and every
//! non-rescued target, upscale nearest-neighbor to the display resolution,
//! then downsample with area averaging to the small observation frame. The
//! frame feeds the FIFO stack; the observation is the channel-axis
//! concatenation of the whole stack, giving the agent short-term motion
//! cues without explicit velocity state.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::{FrameStack, ObservationBuilder, RgbFrame};
use crate::assets::{Sprite, SpriteSet};
use crate::config::EnvConfig;
use crate::engine::snapshot::EpisodeSnapshot;
use crate::map::GridPos;

// ============================================================================
// VisualObservation
// ============================================================================

/// Stacked visual observation, frames oldest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualObservation {
    /// Frame side in pixels
    pub width: u32,
    pub height: u32,
    /// One frame per stack slot, oldest first
    pub frames: Vec<RgbFrame>,
}

impl VisualObservation {
    /// Total channel count across the stack.
    pub fn channels(&self) -> usize {
        self.frames.len() * 3
    }

    /// Observation shape as `(height, width, channels)`.
    pub fn shape(&self) -> (u32, u32, usize) {
        (self.height, self.width, self.channels())
    }

    /// Flatten to HWC bytes with the frames concatenated along the channel
    /// axis: for every pixel, frame 0's RGB comes first, the newest last.
    pub fn stacked_channels(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity((self.width * self.height) as usize * self.channels());
        for y in 0..self.height {
            for x in 0..self.width {
                for frame in &self.frames {
                    out.extend_from_slice(&frame.pixel(x, y));
                }
            }
        }
        out
    }

    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ============================================================================
// VisualBuilder
// ============================================================================

/// Builder for [`VisualObservation`].
pub struct VisualBuilder {
    base: RgbFrame,
    sprites: SpriteSet,
    viewport: u32,
    display: u32,
    frame: u32,
    tile_size: u32,
    stack: FrameStack,
}

impl VisualBuilder {
    /// Pre-render the static map once; per-step work only composites over
    /// crops of it.
    pub fn new(map_img: &RgbImage, config: &EnvConfig, sprites: SpriteSet) -> Self {
        let mut base = RgbFrame::black(config.map.width, config.map.height);
        for y in 0..config.map.height {
            for x in 0..config.map.width {
                base.set_pixel(x, y, map_img.get_pixel(x, y).0);
            }
        }
        Self {
            base,
            sprites,
            viewport: config.viewport_size,
            display: config.display_size,
            frame: config.frame_size,
            tile_size: config.map.tile_size,
            stack: FrameStack::new(config.frame_stack_len),
        }
    }

    /// Top-left corner of the crop: the robot's center minus half a
    /// viewport, clamped so the crop never leaves the map.
    fn viewport_origin(&self, robot: GridPos) -> (u32, u32) {
        let half_tile = (self.tile_size / 2) as i32;
        let radius = (self.viewport / 2) as i32;
        let max_x = (self.base.width - self.viewport) as i32;
        let max_y = (self.base.height - self.viewport) as i32;
        let vx = (robot.x + half_tile - radius).clamp(0, max_x);
        let vy = (robot.y + half_tile - radius).clamp(0, max_y);
        (vx as u32, vy as u32)
    }

    /// Render the current downsampled frame without touching the stack.
    pub fn render_frame(&self, snapshot: &EpisodeSnapshot) -> RgbFrame {
        let (vx, vy) = self.viewport_origin(snapshot.robot_pos);

        let mut crop = RgbFrame::black(self.viewport, self.viewport);
        for y in 0..self.viewport {
            for x in 0..self.viewport {
                crop.set_pixel(x, y, self.base.pixel(vx + x, vy + y));
            }
        }

        blit_sprite(
            &mut crop,
            &self.sprites.robot,
            snapshot.robot_pos.x - vx as i32,
            snapshot.robot_pos.y - vy as i32,
        );
        for target in snapshot.targets.iter().filter(|t| !t.rescued) {
            let Some(pos) = target.pos else {
                continue;
            };
            blit_sprite(
                &mut crop,
                self.sprites.target(target.index),
                pos.x - vx as i32,
                pos.y - vy as i32,
            );
        }

        let scaled = upscale_nearest(&crop, self.display);
        downsample_area(&scaled, self.frame)
    }
}

impl ObservationBuilder for VisualBuilder {
    type Output = VisualObservation;

    fn build(&mut self, snapshot: &EpisodeSnapshot) -> VisualObservation {
        let frame = self.render_frame(snapshot);
        self.stack.push(frame);
        VisualObservation {
            width: self.frame,
            height: self.frame,
            frames: self.stack.to_frames(),
        }
    }

    fn reset(&mut self) {
        self.stack.clear();
    }
}

// ============================================================================
// Raster helpers
// ============================================================================

/// Composite a sprite at `(ox, oy)` in buffer coordinates, skipping
/// transparent pixels and anything outside the buffer.
fn blit_sprite(buf: &mut RgbFrame, sprite: &Sprite, ox: i32, oy: i32) {
    for sy in 0..sprite.size() {
        for sx in 0..sprite.size() {
            let px = sprite.pixel(sx, sy);
            if px[3] == 0 {
                continue;
            }
            let x = ox + sx as i32;
            let y = oy + sy as i32;
            if x < 0 || y < 0 || x >= buf.width as i32 || y >= buf.height as i32 {
                continue;
            }
            buf.set_pixel(x as u32, y as u32, [px[0], px[1], px[2]]);
        }
    }
}

/// Nearest-neighbor upscale of a square frame.
fn upscale_nearest(src: &RgbFrame, dst_side: u32) -> RgbFrame {
    let mut dst = RgbFrame::black(dst_side, dst_side);
    for y in 0..dst_side {
        let sy = y * src.height / dst_side;
        for x in 0..dst_side {
            let sx = x * src.width / dst_side;
            dst.set_pixel(x, y, src.pixel(sx, sy));
        }
    }
    dst
}

/// Area-averaging downsample of a square frame.
///
/// Each destination pixel averages the exact (fractional) source window it
/// covers, so uniform regions survive unchanged and no source pixel is
/// skipped at non-integer ratios.
fn downsample_area(src: &RgbFrame, dst_side: u32) -> RgbFrame {
    let mut dst = RgbFrame::black(dst_side, dst_side);
    let scale_x = src.width as f64 / dst_side as f64;
    let scale_y = src.height as f64 / dst_side as f64;

    for y in 0..dst_side {
        let y0 = y as f64 * scale_y;
        let y1 = y0 + scale_y;
        for x in 0..dst_side {
            let x0 = x as f64 * scale_x;
            let x1 = x0 + scale_x;

            let mut acc = [0.0f64; 3];
            let mut py = y0.floor() as u32;
            while (py as f64) < y1 && py < src.height {
                let wy = (y1.min(py as f64 + 1.0) - y0.max(py as f64)).max(0.0);
                let mut px = x0.floor() as u32;
                while (px as f64) < x1 && px < src.width {
                    let wx = (x1.min(px as f64 + 1.0) - x0.max(px as f64)).max(0.0);
                    let rgb = src.pixel(px, py);
                    let w = wx * wy;
                    acc[0] += rgb[0] as f64 * w;
                    acc[1] += rgb[1] as f64 * w;
                    acc[2] += rgb[2] as f64 * w;
                    px += 1;
                }
                py += 1;
            }

            let area = scale_x * scale_y;
            dst.set_pixel(
                x,
                y,
                [
                    (acc[0] / area).round() as u8,
                    (acc[1] / area).round() as u8,
                    (acc[2] / area).round() as u8,
                ],
            );
        }
    }
    dst
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapSpec;
    use crate::engine::snapshot::TargetSnap;
    use crate::map::builtin::paint_tile;

    fn small_config() -> EnvConfig {
        EnvConfig {
            map: MapSpec {
                width: 60,
                height: 60,
                tile_size: 10,
                ..MapSpec::default()
            },
            human_count: 2,
            viewport_size: 20,
            display_size: 40,
            frame_size: 10,
            ..EnvConfig::quick()
        }
    }

    fn small_builder() -> VisualBuilder {
        let config = small_config();
        let spec = config.map;
        let mut img = RgbImage::from_pixel(spec.width, spec.height, image::Rgb(spec.floor_color));
        paint_tile(&mut img, &spec, 0, 0, spec.start_color);
        VisualBuilder::new(&img, &config, SpriteSet::flat(2, spec.tile_size))
    }

    fn snapshot(robot: GridPos, target: Option<GridPos>) -> EpisodeSnapshot {
        EpisodeSnapshot {
            robot_pos: robot,
            targets: vec![
                TargetSnap { index: 0, pos: target, spotted: false, rescued: false },
                TargetSnap { index: 1, pos: Some(GridPos::new(50, 50)), spotted: false, rescued: true },
            ],
            time_left: 1.0,
            steps: 0,
            rescued_count: 1,
        }
    }

    #[test]
    fn test_viewport_clamps_at_edges() {
        let builder = small_builder();
        assert_eq!(builder.viewport_origin(GridPos::new(0, 0)), (0, 0));
        assert_eq!(builder.viewport_origin(GridPos::new(50, 50)), (40, 40));
        // centered: robot center 35, minus radius 10
        assert_eq!(builder.viewport_origin(GridPos::new(30, 30)), (25, 25));
    }

    #[test]
    fn test_rendered_frame_has_configured_size() {
        let builder = small_builder();
        let frame = builder.render_frame(&snapshot(GridPos::new(0, 0), None));
        assert_eq!((frame.width, frame.height), (10, 10));
    }

    #[test]
    fn test_robot_marker_shows_up() {
        let builder = small_builder();
        let frame = builder.render_frame(&snapshot(GridPos::new(0, 0), None));
        // white robot tile over dark floor must brighten at least one pixel
        assert!(frame.data.iter().any(|&b| b > 200));
    }

    #[test]
    fn test_rescued_target_is_not_drawn() {
        let builder = small_builder();
        // robot parked next to the rescued target's tile; nothing else near
        let with_rescued = builder.render_frame(&snapshot(GridPos::new(40, 50), None));
        let mut bare = snapshot(GridPos::new(40, 50), None);
        bare.targets.pop();
        let without = builder.render_frame(&bare);
        assert_eq!(with_rescued, without);
    }

    #[test]
    fn test_reset_replicates_then_step_evicts_oldest() {
        let mut builder = small_builder();

        builder.reset();
        let first = builder.build(&snapshot(GridPos::new(0, 0), None));
        assert_eq!(first.frames.len(), 3);
        assert_eq!(first.frames[0], first.frames[1]);
        assert_eq!(first.frames[1], first.frames[2]);

        let second = builder.build(&snapshot(GridPos::new(10, 0), None));
        assert_eq!(second.frames[0], first.frames[1]);
        assert_eq!(second.frames[1], first.frames[2]);
        assert_ne!(second.frames[2], first.frames[2]);
    }

    #[test]
    fn test_stacked_channel_layout() {
        let mut builder = small_builder();
        builder.reset();
        let obs = builder.build(&snapshot(GridPos::new(0, 0), None));

        let flat = obs.stacked_channels();
        assert_eq!(flat.len(), 10 * 10 * 9);
        assert_eq!(obs.shape(), (10, 10, 9));
        // identical frames: the three channel groups of pixel 0 agree
        assert_eq!(flat[0..3], flat[3..6]);
        assert_eq!(flat[3..6], flat[6..9]);
    }

    #[test]
    fn test_downsample_preserves_uniform_color() {
        let mut src = RgbFrame::black(40, 40);
        for y in 0..40 {
            for x in 0..40 {
                src.set_pixel(x, y, [90, 45, 200]);
            }
        }
        let dst = downsample_area(&src, 7);
        for y in 0..7 {
            for x in 0..7 {
                assert_eq!(dst.pixel(x, y), [90, 45, 200]);
            }
        }
    }

    #[test]
    fn test_downsample_averages_cells() {
        // 2x2 black/white checkerboard folds to mid gray
        let mut src = RgbFrame::black(2, 2);
        src.set_pixel(0, 0, [255, 255, 255]);
        src.set_pixel(1, 1, [255, 255, 255]);
        let dst = downsample_area(&src, 1);
        assert_eq!(dst.pixel(0, 0), [128, 128, 128]);
    }

    #[test]
    fn test_upscale_nearest_blocks() {
        let mut src = RgbFrame::black(2, 2);
        src.set_pixel(1, 0, [10, 20, 30]);
        let dst = upscale_nearest(&src, 4);
        assert_eq!(dst.pixel(2, 0), [10, 20, 30]);
        assert_eq!(dst.pixel(3, 1), [10, 20, 30]);
        assert_eq!(dst.pixel(0, 0), [0, 0, 0]);
    }
}
