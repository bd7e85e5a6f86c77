//! Environment configuration
//!
//! All tuning constants for the simulation live here, serde-serializable so
//! training setups can be captured alongside checkpoints.
//!
//! ## Usage
//! ```rust
//! use snr_core::config::EnvConfig;
//!
//! let config = EnvConfig::default();
//! let quick = EnvConfig::quick();
//! ```

use serde::{Deserialize, Serialize};

use crate::engine::reward::RewardKind;
use crate::error::{EnvError, Result};
use crate::observation::ObservationKind;

// ============================================================================
// MapSpec
// ============================================================================

/// Geometry and reserved colors of the source map bitmap.
///
/// The bitmap is sampled at every `tile_size`-aligned point; a sampled pixel
/// equal to `floor_color` is a floor tile, one equal to `start_color` is the
/// robot spawn tile. Anything else is an obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSpec {
    /// Logical map width in units (pixels of the source bitmap)
    pub width: u32,
    /// Logical map height in units
    pub height: u32,
    /// Sampling stride; robot and targets stay aligned to this grid
    pub tile_size: u32,
    /// Exact RGB of walkable floor tiles
    pub floor_color: [u8; 3],
    /// Exact RGB of the spawn ("golden") tile
    pub start_color: [u8; 3],
}

impl Default for MapSpec {
    fn default() -> Self {
        Self {
            width: 580,
            height: 420,
            tile_size: 20,
            floor_color: [45, 26, 43],
            start_color: [74, 50, 50],
        }
    }
}

// ============================================================================
// EnvConfig
// ============================================================================

/// Full environment configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Map bitmap geometry and reserved colors
    pub map: MapSpec,

    /// Number of targets placed per episode
    pub human_count: usize,

    /// Episode time budget in seconds
    pub game_duration_secs: f32,

    /// Logical step rate; each step consumes `1/fps` seconds
    pub fps: u32,

    /// Side of the square crop rendered around the robot, also the
    /// visibility radius in units
    pub viewport_size: u32,

    /// Side of the intermediate upscaled render
    pub display_size: u32,

    /// Side of the downsampled observation frame
    pub frame_size: u32,

    /// Depth of the rolling visual frame stack
    pub frame_stack_len: usize,

    /// Observation assembly mode
    pub observation: ObservationKind,

    /// Reward policy selection
    pub reward: RewardKind,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            map: MapSpec::default(),
            human_count: 3,
            game_duration_secs: 30.0,
            fps: 30,
            viewport_size: 100,
            display_size: 750,
            frame_size: 84,
            frame_stack_len: 3,
            observation: ObservationKind::Visual,
            reward: RewardKind::Shaped,
        }
    }
}

impl EnvConfig {
    /// Short-episode preset for tests and smoke rollouts (3 seconds,
    /// vector observations).
    pub fn quick() -> Self {
        Self {
            game_duration_secs: 3.0,
            observation: ObservationKind::Vector,
            ..Self::default()
        }
    }

    /// Default config with vector observations.
    pub fn vector() -> Self {
        Self {
            observation: ObservationKind::Vector,
            ..Self::default()
        }
    }

    /// Default config with visual observations.
    pub fn visual() -> Self {
        Self {
            observation: ObservationKind::Visual,
            ..Self::default()
        }
    }

    /// Seconds consumed by one step.
    pub fn step_delta_secs(&self) -> f32 {
        1.0 / self.fps as f32
    }

    /// Validate invariants that later stages rely on.
    pub fn validate(&self) -> Result<()> {
        if self.map.tile_size == 0 {
            return Err(EnvError::InvalidConfig("tile_size must be > 0".into()));
        }
        if self.map.width == 0 || self.map.height == 0 {
            return Err(EnvError::InvalidConfig("map dimensions must be > 0".into()));
        }
        if self.map.floor_color == self.map.start_color {
            return Err(EnvError::InvalidConfig(
                "floor_color and start_color must differ".into(),
            ));
        }
        if self.human_count == 0 {
            return Err(EnvError::InvalidConfig("human_count must be > 0".into()));
        }
        if self.fps == 0 {
            return Err(EnvError::InvalidConfig("fps must be > 0".into()));
        }
        if self.game_duration_secs <= 0.0 {
            return Err(EnvError::InvalidConfig(
                "game_duration_secs must be > 0".into(),
            ));
        }
        if self.viewport_size == 0
            || self.viewport_size > self.map.width
            || self.viewport_size > self.map.height
        {
            return Err(EnvError::InvalidConfig(
                "viewport_size must fit inside the map".into(),
            ));
        }
        if self.display_size < self.viewport_size {
            return Err(EnvError::InvalidConfig(
                "display_size must be >= viewport_size".into(),
            ));
        }
        if self.frame_size == 0 || self.frame_size > self.display_size {
            return Err(EnvError::InvalidConfig(
                "frame_size must be in 1..=display_size".into(),
            ));
        }
        if self.frame_stack_len == 0 {
            return Err(EnvError::InvalidConfig("frame_stack_len must be > 0".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
