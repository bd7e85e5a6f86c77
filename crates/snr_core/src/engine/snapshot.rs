//! Episode snapshot
//!
//! Read-only export of the episode state, taken once per step. Observation
//! builders derive everything from this value and never see the controller,
//! so the one state machine serves every observation mode.

use serde::{Deserialize, Serialize};

use crate::map::GridPos;

/// Per-target state as visible to observers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetSnap {
    pub index: usize,
    pub pos: Option<GridPos>,
    pub spotted: bool,
    pub rescued: bool,
}

impl TargetSnap {
    /// Placed and still waiting for rescue, i.e. should be drawn/reported.
    pub fn is_active(&self) -> bool {
        self.pos.is_some() && !self.rescued
    }
}

/// Immutable per-step state export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeSnapshot {
    /// Robot tile position
    pub robot_pos: GridPos,
    /// All targets in identity order, length `human_count`
    pub targets: Vec<TargetSnap>,
    /// Seconds remaining on the episode clock
    pub time_left: f32,
    /// Steps taken this episode
    pub steps: u32,
    /// Rescued so far
    pub rescued_count: u32,
}
