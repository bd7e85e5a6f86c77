//! Episode statistics
//!
//! Running totals a training loop wants to log per episode: step count,
//! cumulative reward, rescues and how the episode ended.

use serde::{Deserialize, Serialize};

use crate::engine::events::StepEvents;

// ============================================================================
// TerminationReason
// ============================================================================

/// Why (or whether) an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Episode still running
    #[default]
    InProgress,
    /// Every target rescued
    AllRescued,
    /// Clock expired first
    TimeUp,
}

impl TerminationReason {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TerminationReason::InProgress)
    }
}

// ============================================================================
// EpisodeStats
// ============================================================================

/// Per-episode statistics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EpisodeStats {
    /// Steps taken this episode
    pub steps: u32,

    /// Sum of per-step rewards
    pub cumulative_reward: f32,

    /// Targets rescued so far
    pub rescued_count: u32,

    /// How the episode ended
    pub termination: TerminationReason,
}

impl EpisodeStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one step into the totals.
    pub fn record_step(&mut self, reward: f32, events: &StepEvents) {
        self.steps += 1;
        self.cumulative_reward += reward;
        self.rescued_count = events.rescued_total;
        self.termination = events.termination;
    }

    /// Mean reward per step, 0 before the first step.
    pub fn mean_reward(&self) -> f32 {
        if self.steps == 0 {
            0.0
        } else {
            self.cumulative_reward / self.steps as f32
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

// ============================================================================
// Tests
// ============================================================================
