//! Gym-style environment facade
//!
//! Thin composition of the episode controller, the configured observation
//! builder and the configured reward policy behind the reset/step/render/
//! close surface a training harness expects. One instance per rollout
//! worker; instances share nothing but the immutable map.

use std::path::Path;
use std::sync::Arc;

use image::RgbImage;
use log::info;
use serde::{Deserialize, Serialize};

use crate::assets::SpriteSet;
use crate::config::EnvConfig;
use crate::engine::episode::EpisodeController;
use crate::engine::events::StepEvents;
use crate::engine::reward::{EpisodeStats, RewardFunction, TerminationReason};
use crate::engine::snapshot::EpisodeSnapshot;
use crate::engine::MoveAction;
use crate::error::{MapError, Result};
use crate::map::{builtin, TileMap};
use crate::observation::{
    Observation, ObservationBuilder, ObservationKind, RgbFrame, VectorBuilder, VisualBuilder,
};

// ============================================================================
// StepInfo / StepOutput
// ============================================================================

/// Auxiliary per-step information.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// Targets rescued so far this episode
    pub rescued_count: u32,
    /// Seconds remaining on the episode clock
    pub time_left: f32,
}

impl StepInfo {
    fn from_snapshot(snapshot: &EpisodeSnapshot) -> Self {
        Self {
            rescued_count: snapshot.rescued_count,
            time_left: snapshot.time_left,
        }
    }
}

/// Everything one `step` returns.
#[derive(Debug, Clone)]
pub struct StepOutput {
    pub observation: Observation,
    pub reward: f32,
    /// Episode reached a terminal state on this step
    pub terminated: bool,
    /// Kept for interface parity; the clock is part of the episode
    /// semantics, so expiry reports as `terminated`, never `truncated`
    pub truncated: bool,
    pub info: StepInfo,
}

// ============================================================================
// Observation pipeline
// ============================================================================

/// The configured builder, dispatched by observation mode.
enum ObsPipeline {
    Vector(VectorBuilder),
    Visual(Box<VisualBuilder>),
}

impl ObsPipeline {
    fn build(&mut self, snapshot: &EpisodeSnapshot) -> Observation {
        match self {
            ObsPipeline::Vector(b) => Observation::Vector(b.build(snapshot)),
            ObsPipeline::Visual(b) => Observation::Visual(b.build(snapshot)),
        }
    }

    fn reset(&mut self) {
        match self {
            ObsPipeline::Vector(b) => b.reset(),
            ObsPipeline::Visual(b) => b.reset(),
        }
    }

    fn render(&self, snapshot: &EpisodeSnapshot) -> Option<RgbFrame> {
        match self {
            ObsPipeline::Vector(_) => None,
            ObsPipeline::Visual(b) => Some(b.render_frame(snapshot)),
        }
    }
}

// ============================================================================
// SearchRescueEnv
// ============================================================================

/// The search-and-rescue environment.
pub struct SearchRescueEnv {
    controller: EpisodeController,
    pipeline: ObsPipeline,
    reward: Box<dyn RewardFunction>,
    stats: EpisodeStats,
    best_rescue_secs: Option<f32>,
}

impl SearchRescueEnv {
    /// Build the environment over an in-memory map bitmap, with flat-color
    /// markers standing in for sprite assets.
    pub fn from_image(config: EnvConfig, map_img: &RgbImage) -> Result<Self> {
        Self::assemble(config, map_img, None)
    }

    /// Build over an in-memory map bitmap with loaded sprite assets.
    pub fn from_image_with_sprites(
        config: EnvConfig,
        map_img: &RgbImage,
        sprites: SpriteSet,
    ) -> Result<Self> {
        Self::assemble(config, map_img, Some(sprites))
    }

    /// Load the map bitmap from disk, then build. Decode failures are fatal
    /// setup errors.
    pub fn from_path<P: AsRef<Path>>(config: EnvConfig, map_path: P) -> Result<Self> {
        let img = image::open(map_path).map_err(MapError::from)?.to_rgb8();
        Self::assemble(config, &img, None)
    }

    /// Build over the built-in demo map (default geometry only).
    pub fn builtin(config: EnvConfig) -> Result<Self> {
        Self::assemble(config, builtin::demo_map(), None)
    }

    fn assemble(config: EnvConfig, map_img: &RgbImage, sprites: Option<SpriteSet>) -> Result<Self> {
        config.validate()?;
        let map = Arc::new(TileMap::from_image(map_img, &config.map)?);

        let pipeline = match config.observation {
            ObservationKind::Vector => ObsPipeline::Vector(VectorBuilder::new(config.human_count)),
            ObservationKind::Visual => {
                let sprites = sprites
                    .unwrap_or_else(|| SpriteSet::flat(config.human_count, config.map.tile_size));
                ObsPipeline::Visual(Box::new(VisualBuilder::new(map_img, &config, sprites)))
            }
        };

        let reward = config.reward.create();
        info!(
            "environment ready: {:?} observations, {} reward",
            config.observation,
            reward.name()
        );
        let controller = EpisodeController::new(map, config)?;

        Ok(Self {
            controller,
            pipeline,
            reward,
            stats: EpisodeStats::new(),
            best_rescue_secs: None,
        })
    }

    /// Start a new episode; `Some(seed)` makes it reproducible.
    pub fn reset(&mut self, seed: Option<u64>) -> (Observation, StepInfo) {
        self.controller.reset(seed);
        self.reward.reset();
        self.stats.reset();
        self.pipeline.reset();

        let snapshot = self.controller.snapshot();
        let observation = self.pipeline.build(&snapshot);
        (observation, StepInfo::from_snapshot(&snapshot))
    }

    /// Advance one step.
    ///
    /// Errors with [`crate::EnvError::EpisodeOver`] when called after a
    /// terminal step without an intervening `reset`.
    pub fn step(&mut self, action: MoveAction) -> Result<StepOutput> {
        let events = self.controller.step(action)?;
        let reward = self.reward.compute(&events);
        self.stats.record_step(reward, &events);
        self.track_best_rescue(&events);

        let snapshot = self.controller.snapshot();
        Ok(StepOutput {
            observation: self.pipeline.build(&snapshot),
            reward,
            terminated: events.is_terminal(),
            truncated: false,
            info: StepInfo::from_snapshot(&snapshot),
        })
    }

    /// Advance one step from a raw discrete action index.
    ///
    /// Indices outside `0..4` error with [`crate::EnvError::InvalidAction`].
    pub fn step_index(&mut self, index: u8) -> Result<StepOutput> {
        self.step(MoveAction::from_index(index)?)
    }

    /// Current rendered frame in visual mode, `None` in vector mode.
    pub fn render(&self) -> Option<RgbFrame> {
        self.pipeline.render(&self.controller.snapshot())
    }

    /// Release display resources. The core renders off-screen only, so this
    /// is an idempotent no-op kept for interface parity with windowed hosts.
    pub fn close(&mut self) {}

    fn track_best_rescue(&mut self, events: &StepEvents) {
        if events.termination == TerminationReason::AllRescued {
            let elapsed = self.controller.elapsed();
            match self.best_rescue_secs {
                Some(best) if best <= elapsed => {}
                _ => self.best_rescue_secs = Some(elapsed),
            }
        }
    }

    /// Size of the discrete action space.
    pub fn action_count(&self) -> usize {
        MoveAction::COUNT
    }

    pub fn config(&self) -> &EnvConfig {
        self.controller.config()
    }

    pub fn map(&self) -> &Arc<TileMap> {
        self.controller.map()
    }

    /// Running statistics for the current episode.
    pub fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    /// Fastest full clear across every episode of this instance.
    pub fn best_rescue_secs(&self) -> Option<f32> {
        self.best_rescue_secs
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapSpec;
    use crate::error::EnvError;
    use crate::map::builtin::paint_tile;
    use crate::observation::VectorObservation;

    fn open_image(spec: &MapSpec) -> RgbImage {
        let mut img = RgbImage::from_pixel(spec.width, spec.height, image::Rgb(spec.floor_color));
        paint_tile(&mut img, spec, 0, 0, spec.start_color);
        img
    }

    fn single_tile_image(spec: &MapSpec) -> RgbImage {
        let mut img = RgbImage::from_pixel(spec.width, spec.height, image::Rgb([0, 0, 0]));
        paint_tile(&mut img, spec, 0, 0, spec.start_color);
        img
    }

    fn vector_env() -> SearchRescueEnv {
        let config = EnvConfig::quick();
        let img = open_image(&config.map);
        SearchRescueEnv::from_image(config, &img).unwrap()
    }

    #[test]
    fn test_reset_shape_and_info() {
        let mut env = vector_env();
        let (obs, info) = env.reset(Some(4));

        let vector = obs.as_vector().unwrap();
        assert_eq!(vector.len(), VectorObservation::len_for(3));
        assert_eq!(info.rescued_count, 0);
        assert_eq!(info.time_left, 3.0);
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let mut a = vector_env();
        let mut b = vector_env();
        a.reset(Some(77));
        b.reset(Some(77));

        for idx in [1u8, 2, 1, 0, 3, 1, 2, 2] {
            let oa = a.step_index(idx).unwrap();
            let ob = b.step_index(idx).unwrap();
            assert_eq!(oa.reward, ob.reward);
            assert_eq!(
                oa.observation.as_vector().unwrap(),
                ob.observation.as_vector().unwrap()
            );
            assert_eq!(oa.info, ob.info);
        }
    }

    #[test]
    fn test_invalid_action_index_is_signaled() {
        let mut env = vector_env();
        env.reset(Some(1));
        assert!(matches!(env.step_index(9), Err(EnvError::InvalidAction(9))));
    }

    #[test]
    fn test_instant_rescue_full_clear() {
        let config = EnvConfig {
            human_count: 1,
            ..EnvConfig::quick()
        };
        let img = single_tile_image(&config.map);
        let mut env = SearchRescueEnv::from_image(config, &img).unwrap();
        env.reset(Some(0));

        // sole target is under the robot; the first (blocked) step rescues it
        let out = env.step(MoveAction::Up).unwrap();
        assert!(out.terminated);
        assert!(!out.truncated);
        assert_eq!(out.info.rescued_count, 1);
        // blocked move, spotting, proximity, rescue, geometric and clear bonus
        let expected = -0.01 - 0.2 + 0.5 + 0.5 + 10.0 + 5.0 + 25.0;
        assert!((out.reward - expected).abs() < 1e-4);
        assert_eq!(env.stats().termination, TerminationReason::AllRescued);
        assert!((env.best_rescue_secs().unwrap() - 1.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_step_after_terminal_is_rejected() {
        let config = EnvConfig {
            human_count: 1,
            ..EnvConfig::quick()
        };
        let img = single_tile_image(&config.map);
        let mut env = SearchRescueEnv::from_image(config, &img).unwrap();
        env.reset(Some(0));

        env.step(MoveAction::Up).unwrap();
        assert!(matches!(env.step(MoveAction::Up), Err(EnvError::EpisodeOver)));

        let (_, info) = env.reset(Some(0));
        assert_eq!(info.rescued_count, 0);
        assert!(env.step(MoveAction::Up).is_ok());
    }

    #[test]
    fn test_partial_rescue_then_timeout() {
        // one placeable tile, two declared targets: one instant rescue, then
        // the clock must run out (3s * 30fps = 90 steps)
        let config = EnvConfig {
            human_count: 2,
            ..EnvConfig::quick()
        };
        let img = single_tile_image(&config.map);
        let mut env = SearchRescueEnv::from_image(config, &img).unwrap();
        env.reset(Some(0));

        let mut last = env.step(MoveAction::Left).unwrap();
        assert_eq!(last.info.rescued_count, 1);
        for _ in 1..90 {
            last = env.step(MoveAction::Left).unwrap();
        }
        assert!(last.terminated);
        assert_eq!(env.stats().termination, TerminationReason::TimeUp);
        assert_eq!(env.stats().steps, 90);
        // no full clear: best time never recorded
        assert!(env.best_rescue_secs().is_none());
    }

    #[test]
    fn test_visual_mode_stack_through_reset_and_step() {
        let config = EnvConfig {
            human_count: 2,
            observation: ObservationKind::Visual,
            viewport_size: 40,
            display_size: 80,
            frame_size: 12,
            ..EnvConfig::quick()
        };
        let img = open_image(&config.map);
        let mut env = SearchRescueEnv::from_image(config, &img).unwrap();

        let (obs, _) = env.reset(Some(3));
        let visual = obs.as_visual().unwrap();
        assert_eq!(visual.frames.len(), 3);
        assert_eq!(visual.frames[0], visual.frames[1]);
        assert_eq!(visual.frames[1], visual.frames[2]);
        assert_eq!(visual.shape(), (12, 12, 9));

        let out = env.step(MoveAction::Right).unwrap();
        let next = out.observation.as_visual().unwrap();
        assert_eq!(next.frames[0], visual.frames[1]);
        assert_eq!(next.frames[1], visual.frames[2]);
    }

    #[test]
    fn test_render_mode_gating() {
        let mut env = vector_env();
        env.reset(Some(1));
        assert!(env.render().is_none());

        let config = EnvConfig {
            observation: ObservationKind::Visual,
            viewport_size: 40,
            display_size: 80,
            frame_size: 12,
            ..EnvConfig::quick()
        };
        let img = open_image(&config.map);
        let mut visual_env = SearchRescueEnv::from_image(config, &img).unwrap();
        visual_env.reset(Some(1));
        let frame = visual_env.render().unwrap();
        assert_eq!((frame.width, frame.height), (12, 12));
        visual_env.close();
    }

    #[test]
    fn test_sparse_reward_selection() {
        let config = EnvConfig {
            human_count: 1,
            reward: crate::engine::reward::RewardKind::Sparse,
            ..EnvConfig::quick()
        };
        let img = single_tile_image(&config.map);
        let mut env = SearchRescueEnv::from_image(config, &img).unwrap();
        env.reset(Some(0));

        let out = env.step(MoveAction::Up).unwrap();
        // full clear: 100 plus the saved-count bonus
        assert_eq!(out.reward, 101.0);
    }

    #[test]
    fn test_missing_start_tile_is_fatal() {
        let config = EnvConfig::quick();
        let img = RgbImage::from_pixel(
            config.map.width,
            config.map.height,
            image::Rgb(config.map.floor_color),
        );
        assert!(matches!(
            SearchRescueEnv::from_image(config, &img),
            Err(EnvError::Map(MapError::StartTileMissing))
        ));
    }
}
