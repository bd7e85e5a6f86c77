//! Dense shaping reward
//!
//! The default training signal. Per step: a small time-pressure penalty,
//! a bonus for accepted moves and a larger penalty for walking into
//! obstacles, a one-time spotting bonus per target, continuous proximity
//! shaping while a target is in range, and a large rescue payout. At episode
//! end a geometric bonus scales with how many targets were saved, a flat
//! bonus rewards a full clear and a flat penalty punishes saving nobody.

use super::{RewardFunction, TerminationReason};
use crate::engine::events::StepEvents;

/// Base reward applied to every step before adjustments.
pub const STEP_PENALTY: f32 = -0.01;
/// Accepted one-tile move.
pub const VALID_MOVE_BONUS: f32 = 0.1;
/// Move rejected by the map.
pub const BLOCKED_MOVE_PENALTY: f32 = -0.2;
/// First visibility contact with a target.
pub const SPOTTED_BONUS: f32 = 0.5;
/// Weight on the continuous proximity score.
pub const PROXIMITY_WEIGHT: f32 = 0.5;
/// Reaching a target.
pub const RESCUE_BONUS: f32 = 10.0;
/// Terminal geometric base: `5^(i+1)` per saved target.
pub const COUNT_BONUS_BASE: f32 = 5.0;
/// Every target saved before the clock ran out.
pub const FULL_CLEAR_BONUS: f32 = 25.0;
/// Episode ended with nobody saved.
pub const NO_RESCUE_PENALTY: f32 = -20.0;

/// Dense movement/visibility/rescue shaping.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapedRescueReward;

impl ShapedRescueReward {
    pub fn new() -> Self {
        Self
    }
}

impl RewardFunction for ShapedRescueReward {
    fn compute(&mut self, events: &StepEvents) -> f32 {
        let mut reward = STEP_PENALTY;

        reward += if events.moved {
            VALID_MOVE_BONUS
        } else {
            BLOCKED_MOVE_PENALTY
        };

        for contact in &events.contacts {
            if contact.newly_spotted {
                reward += SPOTTED_BONUS;
            }
            // paid every in-range step, including the spotting step
            reward += contact.proximity * PROXIMITY_WEIGHT;
            if contact.newly_rescued {
                reward += RESCUE_BONUS;
            }
        }

        if events.is_terminal() {
            // 5 for the first save, 25 more for the second, 125 for the third
            for i in 0..events.rescued_total {
                reward += COUNT_BONUS_BASE.powi(i as i32 + 1);
            }
            match events.termination {
                TerminationReason::AllRescued => reward += FULL_CLEAR_BONUS,
                TerminationReason::TimeUp if events.rescued_total == 0 => {
                    reward += NO_RESCUE_PENALTY;
                }
                _ => {}
            }
        }

        reward
    }

    fn name(&self) -> &str {
        "shaped_rescue"
    }
}

// ============================================================================
// Tests
// ============================================================================
