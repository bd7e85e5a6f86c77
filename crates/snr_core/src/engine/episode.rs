//! Episode controller
//!
//! Owns every piece of mutable per-episode state (robot, targets, clock,
//! RNG) and drives the two-phase lifecycle: `Active` while the episode runs,
//! `Done` after the last rescue or the final tick. The controller is a plain
//! value; hosts that want parallel rollouts construct one per environment
//! and never share it.

use std::sync::Arc;

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::EnvConfig;
use crate::engine::actions::MoveAction;
use crate::engine::clock::EpisodeClock;
use crate::engine::entities::{place_targets, RobotState, TargetEntity};
use crate::engine::events::{StepEvents, TargetContact};
use crate::engine::reward::TerminationReason;
use crate::engine::snapshot::{EpisodeSnapshot, TargetSnap};
use crate::engine::visibility::proximity;
use crate::error::{EnvError, Result};
use crate::map::TileMap;

// ============================================================================
// EpisodePhase
// ============================================================================

/// Lifecycle phase of the current episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodePhase {
    /// Steps are accepted
    Active,
    /// Terminal; `reset` is required before the next step
    Done,
}

// ============================================================================
// EpisodeController
// ============================================================================

/// The simulation state machine.
pub struct EpisodeController {
    map: Arc<TileMap>,
    config: EnvConfig,
    rng: ChaCha8Rng,
    robot: RobotState,
    targets: Vec<TargetEntity>,
    clock: EpisodeClock,
    rescued_count: u32,
    phase: EpisodePhase,
}

impl EpisodeController {
    /// Build a controller over a shared map and start the first episode with
    /// an entropy-seeded RNG. Call [`reset`](Self::reset) with a seed for
    /// reproducible layouts.
    pub fn new(map: Arc<TileMap>, config: EnvConfig) -> Result<Self> {
        config.validate()?;
        let mut controller = Self {
            robot: RobotState::new(map.start_position()),
            rng: ChaCha8Rng::from_entropy(),
            targets: Vec::new(),
            clock: EpisodeClock::new(config.game_duration_secs, config.fps),
            rescued_count: 0,
            phase: EpisodePhase::Active,
            map,
            config,
        };
        controller.reset(None);
        Ok(controller)
    }

    /// Start a fresh episode.
    ///
    /// With `Some(seed)` the RNG is reseeded first, making target placement
    /// (and therefore the whole episode, given identical actions) fully
    /// reproducible. With `None` the current RNG stream continues.
    pub fn reset(&mut self, seed: Option<u64>) {
        if let Some(seed) = seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }
        self.robot = RobotState::new(self.map.start_position());
        self.targets = place_targets(
            self.map.traversable_positions(),
            self.config.human_count,
            &mut self.rng,
        );
        self.clock.reset();
        self.rescued_count = 0;
        self.phase = EpisodePhase::Active;
        debug!(
            "episode reset: {} targets placed, robot at ({}, {})",
            self.targets.iter().filter(|t| t.pos.is_some()).count(),
            self.robot.pos.x,
            self.robot.pos.y
        );
    }

    /// Advance the simulation by one action.
    ///
    /// Stepping a `Done` episode is a caller error and returns
    /// [`EnvError::EpisodeOver`]; there is no auto-reset.
    pub fn step(&mut self, action: MoveAction) -> Result<StepEvents> {
        if self.phase == EpisodePhase::Done {
            return Err(EnvError::EpisodeOver);
        }

        // movement: accept only tiles in the traversable set
        let (dx, dy) = action.displacement(self.map.tile_size());
        let candidate = self.robot.pos.offset(dx, dy);
        let moved = self.map.is_traversable(candidate);
        if moved {
            self.robot.pos = candidate;
        }

        self.clock.advance();

        // visibility and rescue, in target-index order
        let radius = self.config.viewport_size as f32;
        let mut contacts = Vec::new();
        for target in &mut self.targets {
            if target.rescued {
                continue;
            }
            let Some(target_pos) = target.pos else {
                continue;
            };

            let score = proximity(self.robot.pos, target_pos, radius);
            if score <= 0.0 {
                continue;
            }

            let newly_spotted = !target.spotted;
            target.spotted = true;

            let newly_rescued = self.robot.pos == target_pos;
            if newly_rescued {
                target.rescued = true;
                self.rescued_count += 1;
            }

            contacts.push(TargetContact {
                index: target.index,
                proximity: score,
                newly_spotted,
                newly_rescued,
            });
        }

        let termination = if self.rescued_count as usize == self.config.human_count {
            TerminationReason::AllRescued
        } else if self.clock.expired() {
            TerminationReason::TimeUp
        } else {
            TerminationReason::InProgress
        };

        if termination.is_terminal() {
            self.phase = EpisodePhase::Done;
            info!(
                "episode over after {} steps: {:?}, {} rescued",
                self.clock.steps(),
                termination,
                self.rescued_count
            );
        }

        Ok(StepEvents {
            moved,
            contacts,
            rescued_total: self.rescued_count,
            termination,
        })
    }

    /// Read-only export of the current state for observers.
    pub fn snapshot(&self) -> EpisodeSnapshot {
        EpisodeSnapshot {
            robot_pos: self.robot.pos,
            targets: self
                .targets
                .iter()
                .map(|t| TargetSnap {
                    index: t.index,
                    pos: t.pos,
                    spotted: t.spotted,
                    rescued: t.rescued,
                })
                .collect(),
            time_left: self.clock.time_left(),
            steps: self.clock.steps(),
            rescued_count: self.rescued_count,
        }
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn map(&self) -> &Arc<TileMap> {
        &self.map
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn rescued_count(&self) -> u32 {
        self.rescued_count
    }

    pub fn time_left(&self) -> f32 {
        self.clock.time_left()
    }

    /// Seconds spent in the current episode.
    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }
}

// ============================================================================
// Tests
// ============================================================================
