//! Visibility model
//!
//! A continuous proximity score drives the shaping reward: 1.0 with the
//! robot on top of a target, falling off linearly to exactly 0.0 at the
//! visibility radius. Pure function, no state.

use crate::map::GridPos;

/// Proximity score in `[0, 1]` between the robot and a target.
///
/// `radius` is the visibility radius in map units (the viewport side).
pub fn proximity(robot: GridPos, target: GridPos, radius: f32) -> f32 {
    let distance = robot.distance_to(target);
    if distance < radius {
        1.0 - distance / radius
    } else {
        0.0
    }
}

// ============================================================================
// Tests
// ============================================================================
